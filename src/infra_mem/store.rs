use crate::domain_model::{FriendRequestRecord, RequestId, UserId};
use crate::domain_port::UserRecord;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Shared backing maps. The email and pair indexes play the role of the
/// unique indexes in the SQL schema: inserts claim an index entry first, so
/// concurrent duplicates cannot both win.
#[derive(Default)]
pub struct MemStore {
    pub users: DashMap<UserId, UserRecord>,
    pub email_index: DashMap<String, UserId>,
    pub requests: DashMap<RequestId, FriendRequestRecord>,
    pub pair_index: DashMap<(UserId, UserId), RequestId>,
    pub friendships: DashMap<(UserId, UserId), DateTime<Utc>>,
}

impl MemStore {
    pub fn new() -> Arc<Self> {
        Arc::new(MemStore::default())
    }
}
