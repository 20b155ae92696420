mod relationship_repo;
mod repo_tx;
mod user_repo;

pub use relationship_repo::*;
pub use repo_tx::*;
pub use user_repo::*;
