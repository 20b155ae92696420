use super::repo_tx_mysql::is_dup_key;
use crate::application_port::AuthError;
use crate::domain_model::UserId;
use crate::domain_port::{NewUser, ProfileUpdate, UserRecord, UserRepo};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};

const USER_COLUMNS: &str = "user_id, email, password_hash, full_name, bio, country, \
     native_language, learning_language, profile_pic, is_onboarded, created_at, updated_at";

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }
}

fn row_to_user(row: &MySqlRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        user_id: row.try_get("user_id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        full_name: row.try_get("full_name")?,
        bio: row.try_get("bio")?,
        country: row.try_get("country")?,
        native_language: row.try_get("native_language")?,
        learning_language: row.try_get("learning_language")?,
        profile_pic: row.try_get("profile_pic")?,
        is_onboarded: row.try_get("is_onboarded")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create(&self, user: &NewUser) -> Result<UserRecord, AuthError> {
        let res = sqlx::query(
            r#"
INSERT INTO user (user_id, email, password_hash, full_name, profile_pic)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(user.user_id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.profile_pic)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => {}
            Err(e) if is_dup_key(&e) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(AuthError::Store(format!("insert user: {e}"))),
        }

        self.get_by_id(user.user_id)
            .await?
            .ok_or_else(|| AuthError::Store("inserted user not readable".to_string()))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Store(format!("query user by email: {e}")))?;

        row.as_ref()
            .map(row_to_user)
            .transpose()
            .map_err(|e| AuthError::Store(format!("decode user row: {e}")))
    }

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM user WHERE user_id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Store(format!("query user by id: {e}")))?;

        row.as_ref()
            .map(row_to_user)
            .transpose()
            .map_err(|e| AuthError::Store(format!("decode user row: {e}")))
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, AuthError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb =
            QueryBuilder::<MySql>::new(format!("SELECT {USER_COLUMNS} FROM user WHERE user_id IN ("));
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
        qb.push(")");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AuthError::Store(format!("query users by ids: {e}")))?;

        rows.iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AuthError::Store(format!("decode user row: {e}")))
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<UserRecord, AuthError> {
        sqlx::query(
            r#"
UPDATE user
SET full_name = ?, bio = ?, country = ?, native_language = ?,
    learning_language = ?, is_onboarded = 1
WHERE user_id = ?
"#,
        )
        .bind(&update.full_name)
        .bind(&update.bio)
        .bind(&update.country)
        .bind(&update.native_language)
        .bind(&update.learning_language)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Store(format!("update profile: {e}")))?;

        // rows_affected is 0 for both "no such user" and "no change";
        // the re-read distinguishes them.
        self.get_by_id(user_id).await?.ok_or(AuthError::UserNotFound)
    }

    async fn list_onboarded_excluding(
        &self,
        exclude: &[UserId],
    ) -> Result<Vec<UserRecord>, AuthError> {
        let mut qb = QueryBuilder::<MySql>::new(format!(
            "SELECT {USER_COLUMNS} FROM user WHERE is_onboarded = 1"
        ));
        if !exclude.is_empty() {
            qb.push(" AND user_id NOT IN (");
            let mut sep = qb.separated(", ");
            for id in exclude {
                sep.push_bind(*id);
            }
            qb.push(")");
        }
        qb.push(" ORDER BY created_at DESC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AuthError::Store(format!("query candidates: {e}")))?;

        rows.iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AuthError::Store(format!("decode user row: {e}")))
    }
}
