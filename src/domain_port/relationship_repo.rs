use crate::application_port::RelationError;
use crate::domain_model::{FriendRequestRecord, RequestId, UserId};
use crate::domain_port::StorageTx;

#[async_trait::async_trait]
pub trait RelationshipRepo: Send + Sync {
    /// Insert a pending request. The store keeps a unique index on the
    /// canonical (min, max) pair, so a second request between the same two
    /// users fails with `DuplicateRequest` regardless of direction, even
    /// when two inserts race past the application-level check.
    async fn insert_request(
        &self,
        sender: UserId,
        recipient: UserId,
    ) -> Result<FriendRequestRecord, RelationError>;

    async fn get_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<FriendRequestRecord>, RelationError>;

    /// Any request between the unordered pair, either direction, any status.
    async fn find_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<FriendRequestRecord>, RelationError>;

    async fn mark_accepted_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        request_id: RequestId,
    ) -> Result<(), RelationError>;

    /// Idempotent symmetric link: inserting an already-present pair is a
    /// no-op, never a duplicate.
    async fn add_friendship_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        a: UserId,
        b: UserId,
    ) -> Result<(), RelationError>;

    async fn are_friends(&self, a: UserId, b: UserId) -> Result<bool, RelationError>;

    async fn list_friend_ids(&self, user_id: UserId) -> Result<Vec<UserId>, RelationError>;

    /// Pending requests where `user_id` is the recipient.
    async fn incoming_pending(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError>;

    /// Pending requests where `user_id` is the sender.
    async fn outgoing_pending(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError>;

    /// Accepted requests where `user_id` was the original sender. A
    /// convenience projection for the notification feed, not the source of
    /// truth for friendship.
    async fn accepted_sent(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError>;
}
