use crate::application_port::{AuthError, RelationError};
use crate::domain_model::{UserId, UserPublic, UserSummary};

/// Profile fields collected during onboarding. All are required; the
/// service reports which ones are missing.
#[derive(Debug, Clone, Default)]
pub struct OnboardInput {
    pub full_name: String,
    pub bio: String,
    pub country: String,
    pub native_language: String,
    pub learning_language: String,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn onboard(&self, user_id: UserId, input: OnboardInput)
    -> Result<UserPublic, AuthError>;

    /// Candidate partners: onboarded users excluding the caller and anyone
    /// already in the caller's friends set.
    async fn recommended(&self, user_id: UserId) -> Result<Vec<UserPublic>, RelationError>;

    async fn friends(&self, user_id: UserId) -> Result<Vec<UserSummary>, RelationError>;
}
