use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_mem::*;
use crate::infra_mysql::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::Arc;

/// Wired service graph. Everything the API layer touches hangs off this;
/// the storage and chat backends are chosen by settings so dev and tests
/// can run without MySQL or the real provider.
pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub relationship_service: Arc<dyn RelationshipService>,
    pub chat_provider: Arc<dyn ChatProvider>,
    pub secure_cookies: bool,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let (user_repo, relationship_repo, tx_manager): (
            Arc<dyn UserRepo>,
            Arc<dyn RelationshipRepo>,
            Arc<dyn TxManager>,
        ) = match settings.storage.backend.as_str() {
            "memory" => {
                let store = MemStore::new();
                (
                    Arc::new(MemUserRepo::new(store.clone())),
                    Arc::new(MemRelationshipRepo::new(store)),
                    Arc::new(MemTxManager),
                )
            }
            "mysql" => {
                let pool = Pool::<MySql>::connect(&settings.storage.mysql_dsn).await?;
                (
                    Arc::new(MySqlUserRepo::new(pool.clone())),
                    Arc::new(MySqlRelationshipRepo::new(pool.clone())),
                    Arc::new(MySqlTxManager::new(pool)),
                )
            }
            other => return Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
        };

        let chat_provider: Arc<dyn ChatProvider> = match settings.chat.backend.as_str() {
            "fake" => Arc::new(FakeChatProvider),
            "stream" => Arc::new(StreamChatProvider::new(ChatProviderConfig {
                api_key: settings.chat.api_key.clone(),
                api_secret: settings.chat.api_secret.clone(),
                base_url: settings.chat.base_url.clone(),
            })),
            other => return Err(anyhow::anyhow!("Unknown chat backend: {}", other)),
        };

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig::new(
            settings.auth.jwt_secret.clone().into_bytes(),
        )));

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            user_repo.clone(),
            credential_hasher,
            token_codec,
            chat_provider.clone(),
        ));
        let user_service: Arc<dyn UserService> = Arc::new(RealUserService::new(
            user_repo.clone(),
            relationship_repo.clone(),
            chat_provider.clone(),
        ));
        let relationship_service: Arc<dyn RelationshipService> = Arc::new(
            RealRelationshipService::new(user_repo, relationship_repo, tx_manager),
        );

        Ok(Server {
            auth_service,
            user_service,
            relationship_service,
            chat_provider,
            secure_cookies: settings.http.secure_cookies,
        })
    }
}
