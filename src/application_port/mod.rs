mod auth_service;
mod chat_provider;
mod relationship_service;
mod user_service;

pub use auth_service::*;
pub use chat_provider::*;
pub use relationship_service::*;
pub use user_service::*;
