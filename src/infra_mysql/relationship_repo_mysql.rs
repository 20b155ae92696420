use super::repo_tx_mysql::{downcast, is_dup_key};
use crate::application_port::RelationError;
use crate::domain_model::{FriendRequestRecord, FriendRequestStatus, RequestId, UserId, UserPair};
use crate::domain_port::{RelationshipRepo, StorageTx};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

const REQUEST_COLUMNS: &str =
    "request_id, sender_id, recipient_id, status, created_at, updated_at";

pub struct MySqlRelationshipRepo {
    pool: MySqlPool,
}

impl MySqlRelationshipRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRelationshipRepo { pool }
    }

    async fn fetch_requests(
        &self,
        sql: &str,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError> {
        let rows = sqlx::query(sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RelationError::Store(format!("query friend requests: {e}")))?;

        rows.iter()
            .map(row_to_request)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RelationError::Store(format!("decode friend request row: {e}")))
    }
}

fn row_to_request(row: &MySqlRow) -> Result<FriendRequestRecord, sqlx::Error> {
    Ok(FriendRequestRecord {
        request_id: row.try_get("request_id")?,
        sender_id: row.try_get("sender_id")?,
        recipient_id: row.try_get("recipient_id")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait::async_trait]
impl RelationshipRepo for MySqlRelationshipRepo {
    async fn insert_request(
        &self,
        sender: UserId,
        recipient: UserId,
    ) -> Result<FriendRequestRecord, RelationError> {
        let request_id = RequestId(Uuid::new_v4());
        let pair = UserPair::new(sender, recipient);

        // UNIQUE (user_min, user_max) is the authoritative duplicate guard;
        // racing inserts lose here, not at the read-then-write check.
        let res = sqlx::query(
            r#"
INSERT INTO friend_request (request_id, user_min, user_max, sender_id, recipient_id, status)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(request_id)
        .bind(pair.min())
        .bind(pair.max())
        .bind(sender)
        .bind(recipient)
        .bind(FriendRequestStatus::Pending)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => {}
            Err(e) if is_dup_key(&e) => return Err(RelationError::DuplicateRequest),
            Err(e) => return Err(RelationError::Store(format!("insert friend request: {e}"))),
        }

        self.get_request(request_id)
            .await?
            .ok_or_else(|| RelationError::Store("inserted request not readable".to_string()))
    }

    async fn get_request(
        &self,
        request_id: RequestId,
    ) -> Result<Option<FriendRequestRecord>, RelationError> {
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_request WHERE request_id = ?"
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("query friend request: {e}")))?;

        row.as_ref()
            .map(row_to_request)
            .transpose()
            .map_err(|e| RelationError::Store(format!("decode friend request row: {e}")))
    }

    async fn find_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<FriendRequestRecord>, RelationError> {
        let pair = UserPair::new(a, b);
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_request WHERE user_min = ? AND user_max = ?"
        ))
        .bind(pair.min())
        .bind(pair.max())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("query pair request: {e}")))?;

        row.as_ref()
            .map(row_to_request)
            .transpose()
            .map_err(|e| RelationError::Store(format!("decode friend request row: {e}")))
    }

    async fn mark_accepted_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        request_id: RequestId,
    ) -> Result<(), RelationError> {
        let tx = downcast(tx);

        sqlx::query("UPDATE friend_request SET status = ? WHERE request_id = ?")
            .bind(FriendRequestStatus::Accepted)
            .bind(request_id)
            .execute(tx.conn())
            .await
            .map_err(|e| RelationError::Store(format!("mark accepted: {e}")))?;

        Ok(())
    }

    async fn add_friendship_in_tx(
        &self,
        tx: &mut dyn StorageTx<'_>,
        a: UserId,
        b: UserId,
    ) -> Result<(), RelationError> {
        if a == b {
            return Err(RelationError::Store(
                "cannot befriend self".to_string(),
            ));
        }
        let pair = UserPair::new(a, b);
        let tx = downcast(tx);

        // Idempotent: re-adding an existing pair is a no-op.
        sqlx::query(
            r#"
INSERT INTO friendship (user_min, user_max)
VALUES (?, ?)
ON DUPLICATE KEY UPDATE user_min = user_min
"#,
        )
        .bind(pair.min())
        .bind(pair.max())
        .execute(tx.conn())
        .await
        .map_err(|e| RelationError::Store(format!("insert friendship: {e}")))?;

        Ok(())
    }

    async fn are_friends(&self, a: UserId, b: UserId) -> Result<bool, RelationError> {
        let pair = UserPair::new(a, b);
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM friendship WHERE user_min = ? AND user_max = ?",
        )
        .bind(pair.min())
        .bind(pair.max())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("query friendship: {e}")))?;

        Ok(count > 0)
    }

    async fn list_friend_ids(&self, user_id: UserId) -> Result<Vec<UserId>, RelationError> {
        let rows = sqlx::query(
            "SELECT user_min, user_max FROM friendship WHERE user_min = ? OR user_max = ?",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelationError::Store(format!("query friend ids: {e}")))?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let min: UserId = row
                .try_get("user_min")
                .map_err(|e| RelationError::Store(format!("decode friendship row: {e}")))?;
            let max: UserId = row
                .try_get("user_max")
                .map_err(|e| RelationError::Store(format!("decode friendship row: {e}")))?;
            ids.push(if min == user_id { max } else { min });
        }
        Ok(ids)
    }

    async fn incoming_pending(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError> {
        self.fetch_requests(
            &format!(
                "SELECT {REQUEST_COLUMNS} FROM friend_request \
                 WHERE recipient_id = ? AND status = 'pending' ORDER BY created_at DESC"
            ),
            user_id,
        )
        .await
    }

    async fn outgoing_pending(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError> {
        self.fetch_requests(
            &format!(
                "SELECT {REQUEST_COLUMNS} FROM friend_request \
                 WHERE sender_id = ? AND status = 'pending' ORDER BY created_at DESC"
            ),
            user_id,
        )
        .await
    }

    async fn accepted_sent(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FriendRequestRecord>, RelationError> {
        self.fetch_requests(
            &format!(
                "SELECT {REQUEST_COLUMNS} FROM friend_request \
                 WHERE sender_id = ? AND status = 'accepted' ORDER BY updated_at DESC"
            ),
            user_id,
        )
        .await
    }
}
