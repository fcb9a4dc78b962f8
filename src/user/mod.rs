pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::UserModel;
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
pub use service::{RegisterUserOutcome, UserDirectory};
