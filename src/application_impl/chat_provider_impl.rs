use crate::application_port::{ChatError, ChatProvider};
use crate::domain_model::UserId;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct ChatProviderConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
}

/// Stream-style managed chat provider. User tokens are HS256 JWTs signed
/// with the provider secret and consumed directly by the client SDK; the
/// only server-to-server call is the identity upsert.
pub struct StreamChatProvider {
    cfg: ChatProviderConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct UserTokenClaims {
    user_id: String,
}

#[derive(Debug, Serialize)]
struct ServerTokenClaims {
    server: bool,
}

impl StreamChatProvider {
    pub fn new(cfg: ChatProviderConfig) -> Self {
        StreamChatProvider {
            cfg,
            http: reqwest::Client::new(),
        }
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, ChatError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.cfg.api_secret.as_bytes()),
        )
        .map_err(|e| ChatError::Token(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ChatProvider for StreamChatProvider {
    async fn upsert_user(
        &self,
        user_id: UserId,
        name: &str,
        image: &str,
    ) -> Result<(), ChatError> {
        let server_token = self.sign(&ServerTokenClaims { server: true })?;
        let id = user_id.to_string();
        let mut users = serde_json::Map::new();
        users.insert(
            id.clone(),
            json!({ "id": id, "name": name, "image": image }),
        );
        let body = json!({ "users": users });

        let response = self
            .http
            .post(format!("{}/users", self.cfg.base_url))
            .query(&[("api_key", self.cfg.api_key.as_str())])
            .header("authorization", server_token)
            .header("stream-auth-type", "jwt")
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChatError::Provider(format!(
                "upsert returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn mint_token(&self, user_id: UserId) -> Result<String, ChatError> {
        self.sign(&UserTokenClaims {
            user_id: user_id.to_string(),
        })
    }
}

/// No-network stand-in for dev settings and tests.
pub struct FakeChatProvider;

#[async_trait::async_trait]
impl ChatProvider for FakeChatProvider {
    async fn upsert_user(
        &self,
        _user_id: UserId,
        _name: &str,
        _image: &str,
    ) -> Result<(), ChatError> {
        Ok(())
    }

    fn mint_token(&self, user_id: UserId) -> Result<String, ChatError> {
        Ok(format!("fake-chat-token:{user_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn minted_token_is_scoped_to_the_user() {
        let provider = StreamChatProvider::new(ChatProviderConfig {
            api_key: "key".into(),
            api_secret: "secret".into(),
            base_url: "https://chat.example.test".into(),
        });
        let user_id = UserId(uuid::Uuid::new_v4());
        let token = provider.mint_token(user_id).unwrap();

        #[derive(serde::Deserialize)]
        struct Decoded {
            user_id: String,
        }
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = false;
        v.required_spec_claims.clear();
        let data =
            decode::<Decoded>(&token, &DecodingKey::from_secret(b"secret"), &v).unwrap();
        assert_eq!(data.claims.user_id, user_id.to_string());
    }
}
