use super::store::MemStore;
use crate::application_port::RelationError;
use crate::domain_model::{FriendRequestRecord, FriendRequestStatus, RequestId, UserId, UserPair};
use crate::domain_port::{RelationshipRepo, StorageTx};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use uuid::Uuid;

pub struct MemRelationshipRepo {
    store: Arc<MemStore>,
}

impl MemRelationshipRepo {
    pub fn new(store: Arc<MemStore>) -> Self {
        MemRelationshipRepo { store }
    }

    fn collect_sorted(
        &self,
        filter: impl Fn(&FriendRequestRecord) -> bool,
        key: fn(&FriendRequestRecord) -> DateTime<Utc>,
    ) -> Vec<FriendRequestRecord> {
        let mut out: Vec<FriendRequestRecord> = self
            .store
            .requests
            .iter()
            .filter(|r| filter(r.value()))
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| key(b).cmp(&key(a)));
        out
    }
}

#[async_trait::async_trait]
impl RelationshipRepo for MemRelationshipRepo {
    async fn insert_request(
        &self,
        sender: UserId,
        recipient: UserId,
    ) -> Result<FriendRequestRecord, RelationError> {
        let pair = UserPair::new(sender, recipient);
        let request_id = RequestId(Uuid::new_v4());

        // The pair index entry is the unordered-pair uniqueness constraint.
        match self.store.pair_index.entry((pair.min(), pair.max())) {
            Entry::Occupied(_) => return Err(RelationError::DuplicateRequest),
            Entry::Vacant(slot) => {
                slot.insert(request_id);
            }
        }

        let now = Utc::now();
        let record = FriendRequestRecord {
            request_id,
            sender_id: sender,
            recipient_id: recipient,
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.store.requests.insert(request_id, record.clone());
        Ok(record)
    }

    async fn get_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<FriendRequestRecord>, RelationError> {
        Ok(self
            .store
            .requests
            .get(&request_id)
            .map(|r| r.value().clone()))
    }

    async fn find_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<FriendRequestRecord>, RelationError> {
        let pair = UserPair::new(a, b);
        let Some(id) = self
            .store
            .pair_index
            .get(&(pair.min(), pair.max()))
            .map(|e| *e.value())
        else {
            return Ok(None);
        };
        self.get_request(id).await
    }

    async fn mark_accepted_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        request_id: RequestId,
    ) -> Result<(), RelationError> {
        let mut entry = self
            .store
            .requests
            .get_mut(&request_id)
            .ok_or(RelationError::RequestNotFound)?;
        entry.value_mut().status = FriendRequestStatus::Accepted;
        entry.value_mut().updated_at = Utc::now();
        Ok(())
    }

    async fn add_friendship_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        a: UserId,
        b: UserId,
    ) -> Result<(), RelationError> {
        if a == b {
            return Err(RelationError::Store("cannot befriend self".to_string()));
        }
        let pair = UserPair::new(a, b);
        // entry() keeps the original link date when the pair already exists.
        self.store
            .friendships
            .entry((pair.min(), pair.max()))
            .or_insert_with(Utc::now);
        Ok(())
    }

    async fn are_friends(&self, a: UserId, b: UserId) -> Result<bool, RelationError> {
        let pair = UserPair::new(a, b);
        Ok(self
            .store
            .friendships
            .contains_key(&(pair.min(), pair.max())))
    }

    async fn list_friend_ids(&self, user_id: UserId) -> Result<Vec<UserId>, RelationError> {
        Ok(self
            .store
            .friendships
            .iter()
            .filter_map(|entry| {
                let (min, max) = *entry.key();
                if min == user_id {
                    Some(max)
                } else if max == user_id {
                    Some(min)
                } else {
                    None
                }
            })
            .collect())
    }

    async fn incoming_pending(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError> {
        Ok(self.collect_sorted(
            |r| r.recipient_id == user_id && r.status == FriendRequestStatus::Pending,
            |r| r.created_at,
        ))
    }

    async fn outgoing_pending(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError> {
        Ok(self.collect_sorted(
            |r| r.sender_id == user_id && r.status == FriendRequestStatus::Pending,
            |r| r.created_at,
        ))
    }

    async fn accepted_sent(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError> {
        // Most recent acceptance first, matching the SQL backend.
        Ok(self.collect_sorted(
            |r| r.sender_id == user_id && r.status == FriendRequestStatus::Accepted,
            |r| r.updated_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_mem::MemTxManager;
    use crate::domain_port::TxManager;

    fn ids() -> (UserId, UserId) {
        (UserId(Uuid::new_v4()), UserId(Uuid::new_v4()))
    }

    #[tokio::test]
    async fn duplicate_request_is_rejected_in_both_directions() {
        let repo = MemRelationshipRepo::new(MemStore::new());
        let (a, b) = ids();

        repo.insert_request(a, b).await.unwrap();
        assert!(matches!(
            repo.insert_request(a, b).await,
            Err(RelationError::DuplicateRequest)
        ));
        assert!(matches!(
            repo.insert_request(b, a).await,
            Err(RelationError::DuplicateRequest)
        ));
    }

    #[tokio::test]
    async fn friendship_insert_is_idempotent() {
        let repo = MemRelationshipRepo::new(MemStore::new());
        let txm = MemTxManager;
        let (a, b) = ids();

        let mut tx = txm.begin().await.unwrap();
        repo.add_friendship_in_tx(&mut *tx, a, b).await.unwrap();
        repo.add_friendship_in_tx(&mut *tx, b, a).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(repo.list_friend_ids(a).await.unwrap(), vec![b]);
        assert_eq!(repo.list_friend_ids(b).await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn accepted_feed_orders_by_acceptance_time() {
        let store = MemStore::new();
        let repo = MemRelationshipRepo::new(store.clone());
        let (a, b) = ids();
        let (_, c) = ids();

        let older = repo.insert_request(a, b).await.unwrap();
        let newer = repo.insert_request(a, c).await.unwrap();

        // The first-created request is accepted last, so it must lead the
        // feed even though its created_at is older.
        for (id, delta) in [(older.request_id, 10), (newer.request_id, 5)] {
            let mut entry = store.requests.get_mut(&id).unwrap();
            entry.value_mut().status = FriendRequestStatus::Accepted;
            entry.value_mut().updated_at = Utc::now() + chrono::Duration::seconds(delta);
        }

        let feed = repo.accepted_sent(a).await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].request_id, older.request_id);
        assert_eq!(feed[1].request_id, newer.request_id);
    }

    #[tokio::test]
    async fn find_between_sees_either_direction() {
        let repo = MemRelationshipRepo::new(MemStore::new());
        let (a, b) = ids();

        let created = repo.insert_request(a, b).await.unwrap();
        let found = repo.find_between(b, a).await.unwrap().unwrap();
        assert_eq!(found.request_id, created.request_id);
    }
}
