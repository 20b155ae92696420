use super::store::MemStore;
use crate::application_port::AuthError;
use crate::domain_model::UserId;
use crate::domain_port::{NewUser, ProfileUpdate, UserRecord, UserRepo};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

pub struct MemUserRepo {
    store: Arc<MemStore>,
}

impl MemUserRepo {
    pub fn new(store: Arc<MemStore>) -> Self {
        MemUserRepo { store }
    }
}

#[async_trait::async_trait]
impl UserRepo for MemUserRepo {
    async fn create(&self, user: &NewUser) -> Result<UserRecord, AuthError> {
        // Claim the email first; this entry is the uniqueness constraint.
        match self.store.email_index.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(AuthError::EmailTaken),
            Entry::Vacant(slot) => {
                slot.insert(user.user_id);
            }
        }

        let now = Utc::now();
        let record = UserRecord {
            user_id: user.user_id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            full_name: user.full_name.clone(),
            bio: String::new(),
            country: String::new(),
            native_language: String::new(),
            learning_language: String::new(),
            profile_pic: user.profile_pic.clone(),
            is_onboarded: false,
            created_at: now,
            updated_at: now,
        };
        self.store.users.insert(user.user_id, record.clone());
        Ok(record)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let Some(id) = self.store.email_index.get(email).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self.store.users.get(&id).map(|r| r.value().clone()))
    }

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.store.users.get(&user_id).map(|r| r.value().clone()))
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<UserRecord>, AuthError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.store.users.get(id).map(|r| r.value().clone()))
            .collect())
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<UserRecord, AuthError> {
        let mut entry = self
            .store
            .users
            .get_mut(&user_id)
            .ok_or(AuthError::UserNotFound)?;

        let record = entry.value_mut();
        record.full_name = update.full_name.clone();
        record.bio = update.bio.clone();
        record.country = update.country.clone();
        record.native_language = update.native_language.clone();
        record.learning_language = update.learning_language.clone();
        record.is_onboarded = true;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn list_onboarded_excluding(
        &self,
        exclude: &[UserId],
    ) -> Result<Vec<UserRecord>, AuthError> {
        let mut out: Vec<UserRecord> = self
            .store
            .users
            .iter()
            .filter(|r| r.value().is_onboarded && !exclude.contains(r.key()))
            .map(|r| r.value().clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}
