use crate::application_port::AuthError;
use crate::domain_model::{UserId, UserPublic, UserSummary};
use chrono::{DateTime, Utc};

/// Full user row, password hash included. Only the repo layer and the
/// credential checks ever see the hash; everything outward goes through
/// `to_public` / `to_summary`.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub bio: String,
    pub country: String,
    pub native_language: String,
    pub learning_language: String,
    pub profile_pic: String,
    pub is_onboarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            user_id: self.user_id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            bio: self.bio.clone(),
            country: self.country.clone(),
            native_language: self.native_language.clone(),
            learning_language: self.learning_language.clone(),
            profile_pic: self.profile_pic.clone(),
            is_onboarded: self.is_onboarded,
            created_at: self.created_at,
        }
    }

    pub fn to_summary(&self) -> UserSummary {
        UserSummary {
            user_id: self.user_id,
            full_name: self.full_name.clone(),
            profile_pic: self.profile_pic.clone(),
            native_language: self.native_language.clone(),
            learning_language: self.learning_language.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub profile_pic: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub bio: String,
    pub country: String,
    pub native_language: String,
    pub learning_language: String,
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a new user. A duplicate email maps to `AuthError::EmailTaken`
    /// via the unique index, so concurrent signups cannot both win.
    async fn create(&self, user: &NewUser) -> Result<UserRecord, AuthError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError>;

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, AuthError>;

    /// Apply onboarding fields and set `is_onboarded`. Does not touch the
    /// password hash.
    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<UserRecord, AuthError>;

    /// Onboarded users minus the given exclusion list (the caller plus its
    /// friends).
    async fn list_onboarded_excluding(
        &self,
        exclude: &[UserId],
    ) -> Result<Vec<UserRecord>, AuthError>;
}
