use crate::domain_model::UserId;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Failed to generate stream token")]
    Token(String),
    #[error("provider error: {0}")]
    Provider(String),
}

/// The managed chat/video provider. It owns all real-time transport; this
/// side only mirrors user identities into it and mints per-user tokens for
/// the client SDK.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Create or refresh the provider-side identity for a user. Callers
    /// treat failures as non-fatal.
    async fn upsert_user(
        &self,
        user_id: UserId,
        name: &str,
        image: &str,
    ) -> Result<(), ChatError>;

    /// Mint a provider token scoped to `user_id`.
    fn mint_token(&self, user_id: UserId) -> Result<String, ChatError>;
}
