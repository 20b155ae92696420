//! In-process storage backend. Dev settings and the test suite run on it;
//! it upholds the same uniqueness and idempotency guarantees as the MySQL
//! adapters via map entry semantics.

mod relationship_repo_mem;
mod repo_tx_mem;
mod store;
mod user_repo_mem;

pub use relationship_repo_mem::*;
pub use repo_tx_mem::*;
pub use store::*;
pub use user_repo_mem::*;
