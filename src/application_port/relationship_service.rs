use crate::domain_model::{FriendRequestRecord, FriendRequestView, UserId};

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("Invalid recipient or request ID")]
    InvalidIdentifier,
    #[error("You cannot send a friend request to yourself")]
    SelfRequest,
    #[error("Recipient not found")]
    RecipientNotFound,
    #[error("Friend request not found")]
    RequestNotFound,
    #[error("You are already friends with this user")]
    AlreadyFriends,
    #[error("a friend request already exists between you and this user")]
    DuplicateRequest,
    #[error("You are not authorized to accept this friend request")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("store error: {0}")]
    Store(String),
}

/// The two notification feeds behind `GET /user/friend-requests`. They are
/// distinct queries: new requests awaiting my answer, and requests I sent
/// that the other side accepted. The friends set, not the accepted feed, is
/// the source of truth for friendship.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestFeeds {
    pub incoming_requests: Vec<FriendRequestView>,
    pub accepted_requests: Vec<FriendRequestView>,
}

#[async_trait::async_trait]
pub trait RelationshipService: Send + Sync {
    /// Create a pending request from `me` to the user named by `recipient`
    /// (a raw id string; malformed ids fail with `InvalidIdentifier`).
    async fn send_request(
        &self,
        me: UserId,
        recipient: &str,
    ) -> Result<FriendRequestRecord, RelationError>;

    /// Transition a pending request to accepted and link both friends sets.
    /// Only the recipient may accept. Re-accepting an accepted request is
    /// an idempotent success.
    async fn accept_request(
        &self,
        me: UserId,
        request: &str,
    ) -> Result<FriendRequestRecord, RelationError>;

    async fn friend_requests(&self, me: UserId) -> Result<FriendRequestFeeds, RelationError>;

    async fn outgoing_requests(&self, me: UserId)
    -> Result<Vec<FriendRequestView>, RelationError>;
}
