use crate::application_port::{AuthError, ChatProvider, OnboardInput, RelationError, UserService};
use crate::domain_model::{UserId, UserPublic, UserSummary};
use crate::domain_port::{ProfileUpdate, RelationshipRepo, UserRepo};
use std::sync::Arc;

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    relationship_repo: Arc<dyn RelationshipRepo>,
    chat_provider: Arc<dyn ChatProvider>,
}

impl RealUserService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        relationship_repo: Arc<dyn RelationshipRepo>,
        chat_provider: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            user_repo,
            relationship_repo,
            chat_provider,
        }
    }
}

fn validate_onboarding(input: &OnboardInput) -> Result<(), AuthError> {
    let missing: Vec<&str> = [
        ("full_name", &input.full_name),
        ("bio", &input.bio),
        ("country", &input.country),
        ("native_language", &input.native_language),
        ("learning_language", &input.learning_language),
    ]
    .iter()
    .filter(|(_, v)| v.trim().is_empty())
    .map(|(name, _)| *name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AuthError::Validation(format!(
            "All fields are required, missing: {}",
            missing.join(", ")
        )))
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn onboard(
        &self,
        user_id: UserId,
        input: OnboardInput,
    ) -> Result<UserPublic, AuthError> {
        validate_onboarding(&input)?;

        let update = ProfileUpdate {
            full_name: input.full_name,
            bio: input.bio,
            country: input.country,
            native_language: input.native_language,
            learning_language: input.learning_language,
        };
        let record = self.user_repo.update_profile(user_id, &update).await?;

        if let Err(e) = self
            .chat_provider
            .upsert_user(record.user_id, &record.full_name, &record.profile_pic)
            .await
        {
            tracing::warn!("chat provider upsert for {}: {e}", record.user_id);
        }

        Ok(record.to_public())
    }

    async fn recommended(&self, user_id: UserId) -> Result<Vec<UserPublic>, RelationError> {
        let mut exclude = self.relationship_repo.list_friend_ids(user_id).await?;
        exclude.push(user_id);

        let candidates = self
            .user_repo
            .list_onboarded_excluding(&exclude)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(candidates.iter().map(|r| r.to_public()).collect())
    }

    async fn friends(&self, user_id: UserId) -> Result<Vec<UserSummary>, RelationError> {
        let ids = self.relationship_repo.list_friend_ids(user_id).await?;
        let friends = self
            .user_repo
            .get_many(&ids)
            .await
            .map_err(|e| RelationError::Store(e.to_string()))?;

        Ok(friends.iter().map(|r| r.to_summary()).collect())
    }
}
