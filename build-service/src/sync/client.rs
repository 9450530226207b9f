// Remote API Client
// Boundary to the code-hosting API used by user sync

use crate::error::ServiceResult;
use crate::sync::models::{AccountEmail, RemoteProfile};

use async_trait::async_trait;

/// Read-only access to the authenticated user's remote account
#[async_trait]
pub trait GithubClient: Send + Sync {
    /// The `user` endpoint
    async fn user(&self) -> ServiceResult<RemoteProfile>;

    /// The `user/emails` endpoint
    async fn emails(&self) -> ServiceResult<Vec<AccountEmail>>;

    /// Whether the account has verified education status
    async fn education(&self) -> ServiceResult<bool>;
}

/// Client answering from recorded responses
#[derive(Debug, Clone)]
pub struct StaticGithubClient {
    pub profile: RemoteProfile,
    pub emails: Vec<AccountEmail>,
    pub education: bool,
}

impl StaticGithubClient {
    pub fn new(profile: RemoteProfile, emails: Vec<AccountEmail>) -> Self {
        Self {
            profile,
            emails,
            education: false,
        }
    }

    pub fn with_education(mut self, education: bool) -> Self {
        self.education = education;
        self
    }
}

#[async_trait]
impl GithubClient for StaticGithubClient {
    async fn user(&self) -> ServiceResult<RemoteProfile> {
        Ok(self.profile.clone())
    }

    async fn emails(&self) -> ServiceResult<Vec<AccountEmail>> {
        Ok(self.emails.clone())
    }

    async fn education(&self) -> ServiceResult<bool> {
        Ok(self.education)
    }
}
