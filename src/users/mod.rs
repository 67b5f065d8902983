pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::UserError;
pub use repository::UsersRepository;
pub use service::UserService;
