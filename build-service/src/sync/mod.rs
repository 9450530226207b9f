// User Sync Module
// Reconciles local user records with profiles from the code-hosting API

pub mod client;
pub mod models;
pub mod store;
pub mod user_info;

// Re-export key types
pub use client::{GithubClient, StaticGithubClient};
pub use models::{AccountEmail, LocalUser, ProfileUpdate, RemoteProfile, EMAIL_SCOPES};
pub use store::{InMemoryUserStore, StoredUser, UserStore};
pub use user_info::UserInfo;
