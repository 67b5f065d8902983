pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::PermissionError;
pub use repository::PermissionsRepository;
pub use service::PermissionService;
