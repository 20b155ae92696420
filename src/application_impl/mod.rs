mod auth_service_impl;
mod chat_provider_impl;
mod relationship_service_impl;
mod user_service_impl;

pub use auth_service_impl::*;
pub use chat_provider_impl::*;
pub use relationship_service_impl::*;
pub use user_service_impl::*;
