use crate::application_port::{FriendRequestFeeds, RelationError, RelationshipService};
use crate::domain_model::{FriendRequestRecord, FriendRequestView, RequestId, UserId};
use crate::domain_port::{RelationshipRepo, TxManager, UserRepo};
use std::collections::HashMap;
use std::sync::Arc;

pub struct RealRelationshipService {
    user_repo: Arc<dyn UserRepo>,
    relationship_repo: Arc<dyn RelationshipRepo>,
    tx_manager: Arc<dyn TxManager>,
}

impl RealRelationshipService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        relationship_repo: Arc<dyn RelationshipRepo>,
        tx_manager: Arc<dyn TxManager>,
    ) -> Self {
        Self {
            user_repo,
            relationship_repo,
            tx_manager,
        }
    }

    /// Attach the counterpart profile to each record. `pick` selects which
    /// end of the request to populate. Records whose counterpart has
    /// vanished are dropped from the feed.
    async fn populate(
        &self,
        records: Vec<FriendRequestRecord>,
        pick: fn(&FriendRequestRecord) -> UserId,
    ) -> Result<Vec<FriendRequestView>, RelationError> {
        let ids: Vec<UserId> = records.iter().map(pick).collect();
        let users = self
            .user_repo
            .get_many(&ids)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;
        let by_id: HashMap<UserId, _> = users
            .into_iter()
            .map(|u| (u.user_id, u.to_summary()))
            .collect();

        Ok(records
            .into_iter()
            .filter_map(|r| {
                let user = by_id.get(&pick(&r)).cloned()?;
                Some(FriendRequestView {
                    request_id: r.request_id,
                    sender_id: r.sender_id,
                    recipient_id: r.recipient_id,
                    status: r.status,
                    created_at: r.created_at,
                    user,
                })
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl RelationshipService for RealRelationshipService {
    async fn send_request(
        &self,
        me: UserId,
        recipient: &str,
    ) -> Result<FriendRequestRecord, RelationError> {
        let recipient_id = recipient
            .parse::<UserId>()
            .map_err(|_| RelationError::InvalidIdentifier)?;

        if recipient_id == me {
            return Err(RelationError::SelfRequest);
        }

        if self
            .user_repo
            .get_by_id(recipient_id)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?
            .is_none()
        {
            return Err(RelationError::RecipientNotFound);
        }

        if self.relationship_repo.are_friends(me, recipient_id).await? {
            return Err(RelationError::AlreadyFriends);
        }

        // Either direction, any status. A pair that has ever had a request
        // keeps it forever (no delete path), so acceptance also blocks
        // re-requesting.
        if self
            .relationship_repo
            .find_between(me, recipient_id)
            .await?
            .is_some()
        {
            return Err(RelationError::DuplicateRequest);
        }

        // The unique pair index backs this insert; a concurrent duplicate
        // surfaces here as DuplicateRequest rather than a second row.
        self.relationship_repo.insert_request(me, recipient_id).await
    }

    async fn accept_request(
        &self,
        me: UserId,
        request: &str,
    ) -> Result<FriendRequestRecord, RelationError> {
        let request_id = request
            .parse::<RequestId>()
            .map_err(|_| RelationError::InvalidIdentifier)?;

        let record = self
            .relationship_repo
            .get_request(request_id)
            .await?
            .ok_or(RelationError::RequestNotFound)?;

        if record.recipient_id != me {
            return Err(RelationError::Forbidden);
        }

        // Status flip and the symmetric friends-set link commit together;
        // a crash cannot leave an accepted request without the friendship.
        // Re-accepting just repeats the idempotent writes.
        let mut tx = self
            .tx_manager
            .begin()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        self.relationship_repo
            .mark_accepted_in_tx(&mut *tx, request_id)
            .await?;
        self.relationship_repo
            .add_friendship_in_tx(&mut *tx, record.sender_id, record.recipient_id)
            .await?;

        tx.commit()
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        // Re-read so the caller sees the persisted row, acceptance
        // timestamp included, not a locally patched snapshot.
        self.relationship_repo
            .get_request(request_id)
            .await?
            .ok_or(RelationError::RequestNotFound)
    }

    async fn friend_requests(&self, me: UserId) -> Result<FriendRequestFeeds, RelationError> {
        let incoming = self.relationship_repo.incoming_pending(me).await?;
        let accepted = self.relationship_repo.accepted_sent(me).await?;

        Ok(FriendRequestFeeds {
            incoming_requests: self.populate(incoming, |r| r.sender_id).await?,
            accepted_requests: self.populate(accepted, |r| r.recipient_id).await?,
        })
    }

    async fn outgoing_requests(
        &self,
        me: UserId,
    ) -> Result<Vec<FriendRequestView>, RelationError> {
        let outgoing = self.relationship_repo.outgoing_pending(me).await?;
        self.populate(outgoing, |r| r.recipient_id).await
    }
}
