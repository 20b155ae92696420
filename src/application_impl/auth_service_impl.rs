use crate::application_port::{
    AuthError, AuthService, AuthSession, ChatProvider, CredentialHasher, LoginInput, SessionClaims,
    SessionToken, SignupInput, TokenCodec,
};
use crate::domain_model::{UserId, UserPublic};
use crate::domain_port::{NewUser, UserRepo};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::Internal(format!("invalid PHC hash: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(format!("verify error: {e}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub signing_key: Vec<u8>,
    pub session_ttl: Duration,
}

impl JwtConfig {
    pub fn new(signing_key: Vec<u8>) -> Self {
        // 1-day sessions, matching the cookie max-age.
        JwtConfig {
            signing_key,
            session_ttl: Duration::days(1),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    name: String,
    iat: i64,
    exp: i64,
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue(
        &self,
        user_id: UserId,
        email: &str,
        full_name: &str,
    ) -> Result<(SessionToken, DateTime<Utc>), AuthError> {
        let iat_dt = Utc::now();
        let exp_dt = iat_dt + self.cfg.session_ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: full_name.to_string(),
            iat: iat_dt.timestamp(),
            exp: exp_dt.timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?;
        Ok((SessionToken(token), exp_dt))
    }

    async fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        v.leeway = 0;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&self.cfg.signing_key), &v)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })?;

        let user_id = data
            .claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::TokenInvalid)?;
        Ok(SessionClaims {
            user_id,
            email: data.claims.email,
            full_name: data.claims.name,
            expires_at: DateTime::from_timestamp(data.claims.exp, 0)
                .ok_or(AuthError::TokenInvalid)?,
        })
    }
}

const ALLOWED_EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "hotmail.com"];
const MIN_PASSWORD_LEN: usize = 6;

fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::Validation("All fields are required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(AuthError::Validation("Invalid email format".into()));
    }
    Ok(())
}

fn validate_signup(input: &SignupInput) -> Result<(), AuthError> {
    if input.full_name.trim().is_empty() {
        return Err(AuthError::Validation("Full name cannot be empty".into()));
    }
    validate_credentials(&input.email, &input.password)?;

    let domain = input.email.rsplit_once('@').map(|(_, d)| d).unwrap_or("");
    if !ALLOWED_EMAIL_DOMAINS
        .iter()
        .any(|allowed| domain.eq_ignore_ascii_case(allowed))
    {
        return Err(AuthError::Validation(
            "Email must be from gmail.com, yahoo.com, or hotmail.com".into(),
        ));
    }
    Ok(())
}

fn random_avatar() -> String {
    let idx = rand::thread_rng().gen_range(1..=100);
    format!("https://avatar.iran.liara.run/public/{idx}.png")
}

pub struct RealAuthService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn TokenCodec>,
    chat_provider: Arc<dyn ChatProvider>,
}

impl RealAuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
        chat_provider: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            token_codec,
            chat_provider,
        }
    }

    async fn issue_session(&self, user: UserPublic) -> Result<AuthSession, AuthError> {
        let (token, _expires_at) = self
            .token_codec
            .issue(user.user_id, &user.email, &user.full_name)
            .await?;
        Ok(AuthSession { user, token })
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn signup(&self, request: SignupInput) -> Result<AuthSession, AuthError> {
        validate_signup(&request)?;

        // Fast path; the unique email index is what actually closes the race.
        if self.user_repo.get_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.credential_hasher.hash_password(&request.password).await?;
        let new_user = NewUser {
            user_id: UserId(Uuid::new_v4()),
            email: request.email,
            password_hash,
            full_name: request.full_name,
            profile_pic: random_avatar(),
        };
        let record = self.user_repo.create(&new_user).await?;

        if let Err(e) = self
            .chat_provider
            .upsert_user(record.user_id, &record.full_name, &record.profile_pic)
            .await
        {
            tracing::warn!("chat provider upsert for {}: {e}", record.user_id);
        }

        self.issue_session(record.to_public()).await
    }

    async fn login(&self, request: LoginInput) -> Result<AuthSession, AuthError> {
        validate_credentials(&request.email, &request.password)?;

        // Unknown email and wrong password take the same exit so callers
        // cannot probe for registered addresses.
        let record = self
            .user_repo
            .get_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&request.password, &record.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(record.to_public()).await
    }

    async fn resolve_session(&self, token: &str) -> Result<UserPublic, AuthError> {
        let claims = self.token_codec.verify(token).await?;

        // Live re-fetch: a deleted user means a dead session, no blocklist
        // needed.
        let record = self
            .user_repo
            .get_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(record.to_public())
    }
}
