// User Sync Data Models
// Local user records, remote profiles and account emails

use serde::{Deserialize, Serialize};

/// Oauth scopes that grant access to the account email list
pub const EMAIL_SCOPES: [&str; 2] = ["user:email", "user"];

/// The locally stored user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: u64,
    /// Numeric id of the account on the code-hosting service
    pub github_id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gravatar_id: Option<String>,
    #[serde(default)]
    pub github_scopes: Vec<String>,
    #[serde(default)]
    pub education: bool,
}

impl LocalUser {
    pub fn new(id: u64, github_id: u64, login: impl Into<String>) -> Self {
        Self {
            id,
            github_id,
            login: login.into(),
            name: None,
            email: None,
            gravatar_id: None,
            github_scopes: Vec::new(),
            education: false,
        }
    }

    /// Whether the granted scopes allow reading the account email list
    pub fn can_read_emails(&self) -> bool {
        self.github_scopes
            .iter()
            .any(|scope| EMAIL_SCOPES.contains(&scope.as_str()))
    }
}

/// Profile returned by the remote `user` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProfile {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gravatar_id: Option<String>,
    /// Public profile email
    #[serde(default)]
    pub email: Option<String>,
}

/// One entry of the remote `user/emails` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEmail {
    pub email: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub primary: bool,
}

impl AccountEmail {
    pub fn new(email: impl Into<String>, verified: bool, primary: bool) -> Self {
        Self {
            email: email.into(),
            verified,
            primary,
        }
    }
}

/// Attributes written to the local user by a successful sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub gravatar_id: Option<String>,
    /// Only present when education data sync is enabled for the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<bool>,
}
