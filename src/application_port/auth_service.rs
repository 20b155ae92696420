use crate::domain_model::{UserId, UserPublic};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already exists, Please use another email")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Unauthorized - Invalid Token")]
    TokenInvalid,
    #[error("Unauthorized - Token Expired")]
    TokenExpired,
    #[error("User not found")]
    UserNotFound,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionToken(pub String);

/// Claims carried by a session token: the subject plus a denormalized
/// display snapshot. Validity is re-derived on every request; the snapshot
/// is never treated as current profile state.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserPublic,
    pub token: SessionToken,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue(
        &self,
        user_id: UserId,
        email: &str,
        full_name: &str,
    ) -> Result<(SessionToken, DateTime<Utc>), AuthError>;
    async fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: SignupInput) -> Result<AuthSession, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<AuthSession, AuthError>;
    /// Verify a presented token and re-fetch the live user. The live fetch
    /// is the revocation mechanism: deleting a user invalidates every
    /// outstanding token for it.
    async fn resolve_session(&self, token: &str) -> Result<UserPublic, AuthError>;
}
