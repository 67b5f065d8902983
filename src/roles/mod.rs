pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::RoleError;
pub use repository::RolesRepository;
pub use service::RoleService;
