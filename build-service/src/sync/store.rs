// User Store
// Persistence boundary for user sync, with an in-memory implementation

use crate::error::{ServiceError, ServiceResult};
use crate::sync::models::{LocalUser, ProfileUpdate};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Writes performed by user sync
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Overwrite profile attributes of a user
    async fn update_profile(&self, user_id: u64, update: &ProfileUpdate) -> ServiceResult<()>;

    /// Email addresses currently recorded for a user
    async fn emails(&self, user_id: u64) -> ServiceResult<Vec<String>>;

    /// Record an email address unless it is already present
    async fn find_or_create_email(&self, user_id: u64, email: &str) -> ServiceResult<()>;

    /// Remove every recorded email not in `keep`, returning how many were removed
    async fn remove_emails_except(&self, user_id: u64, keep: &[String]) -> ServiceResult<usize>;
}

/// A user together with its recorded emails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub user: LocalUser,
    pub emails: Vec<String>,
}

/// Process-local user store
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<u64, StoredUser>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: LocalUser, emails: Vec<String>) {
        self.users
            .write()
            .await
            .insert(user.id, StoredUser { user, emails });
    }

    pub async fn get(&self, user_id: u64) -> Option<StoredUser> {
        self.users.read().await.get(&user_id).cloned()
    }
}

fn not_found(user_id: u64) -> ServiceError {
    ServiceError::Store(format!("user with id {} not found", user_id))
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn update_profile(&self, user_id: u64, update: &ProfileUpdate) -> ServiceResult<()> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user_id).ok_or_else(|| not_found(user_id))?;

        stored.user.login = update.login.clone();
        stored.user.name = update.name.clone();
        stored.user.email = update.email.clone();
        stored.user.gravatar_id = update.gravatar_id.clone();
        if let Some(education) = update.education {
            stored.user.education = education;
        }
        Ok(())
    }

    async fn emails(&self, user_id: u64) -> ServiceResult<Vec<String>> {
        self.users
            .read()
            .await
            .get(&user_id)
            .map(|stored| stored.emails.clone())
            .ok_or_else(|| not_found(user_id))
    }

    async fn find_or_create_email(&self, user_id: u64, email: &str) -> ServiceResult<()> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user_id).ok_or_else(|| not_found(user_id))?;

        if !stored.emails.iter().any(|existing| existing == email) {
            stored.emails.push(email.to_string());
        }
        Ok(())
    }

    async fn remove_emails_except(&self, user_id: u64, keep: &[String]) -> ServiceResult<usize> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user_id).ok_or_else(|| not_found(user_id))?;

        let before = stored.emails.len();
        stored.emails.retain(|email| keep.contains(email));
        Ok(before - stored.emails.len())
    }
}
