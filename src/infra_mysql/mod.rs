mod relationship_repo_mysql;
mod repo_tx_mysql;
mod user_repo_mysql;

pub use relationship_repo_mysql::*;
pub use repo_tx_mysql::*;
pub use user_repo_mysql::*;
