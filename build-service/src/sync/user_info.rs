// User Info Sync
// Reconciles a local user with the profile fetched from the code-hosting API

use crate::error::{ServiceError, ServiceResult};
use crate::features::{self, FeatureGate, FeatureTarget, EDUCATION_DATA_SYNC};
use crate::sync::client::GithubClient;
use crate::sync::models::{AccountEmail, LocalUser, ProfileUpdate, RemoteProfile};
use crate::sync::store::UserStore;

/// Remote account data resolved against one local user
#[derive(Debug, Clone)]
pub struct UserInfo<'a> {
    user: &'a LocalUser,
    profile: RemoteProfile,
    emails: Vec<AccountEmail>,
    education: Option<bool>,
}

impl<'a> UserInfo<'a> {
    /// Account emails are dropped unless the user granted an email scope.
    pub fn new(user: &'a LocalUser, profile: RemoteProfile, emails: Vec<AccountEmail>) -> Self {
        let emails = if user.can_read_emails() {
            emails
        } else {
            Vec::new()
        };
        Self {
            user,
            profile,
            emails,
            education: None,
        }
    }

    pub fn with_education(mut self, education: bool) -> Self {
        self.education = Some(education);
        self
    }

    /// Fetch everything needed for a sync. The email list is only requested
    /// with an email scope; education status only when the feature is enabled
    /// for the user.
    pub async fn fetch<C, G>(user: &'a LocalUser, client: &C, gate: &G) -> ServiceResult<Self>
    where
        C: GithubClient + ?Sized,
        G: FeatureGate + ?Sized,
    {
        let profile = client.user().await?;
        let emails = if user.can_read_emails() {
            client.emails().await?
        } else {
            Vec::new()
        };

        let mut info = Self::new(user, profile, emails);
        if features::is_enabled(gate, EDUCATION_DATA_SYNC, &FeatureTarget::Owner(user.id))? {
            info.education = Some(client.education().await?);
        }
        Ok(info)
    }

    pub fn login(&self) -> &str {
        &self.profile.login
    }

    pub fn name(&self) -> Option<&str> {
        self.profile.name.as_deref()
    }

    pub fn gravatar_id(&self) -> Option<&str> {
        self.profile.gravatar_id.as_deref()
    }

    pub fn education(&self) -> Option<bool> {
        self.education
    }

    /// The email to store on the user. Preference: public profile email,
    /// primary verified account email, any verified account email, the email
    /// already stored, the first account email.
    pub fn email(&self) -> Option<&str> {
        present(self.profile.email.as_deref())
            .or_else(|| {
                self.emails
                    .iter()
                    .find(|e| e.primary && e.verified)
                    .map(|e| e.email.as_str())
            })
            .or_else(|| self.verified_emails().into_iter().next())
            .or_else(|| present(self.user.email.as_deref()))
            .or_else(|| self.emails.first().map(|e| e.email.as_str()))
    }

    /// Verified account emails in listed order
    pub fn verified_emails(&self) -> Vec<&str> {
        self.emails
            .iter()
            .filter(|e| e.verified)
            .map(|e| e.email.as_str())
            .collect()
    }

    /// Emails the user should end up with: every verified one plus the effective email
    pub fn synced_emails(&self) -> Vec<String> {
        let mut emails: Vec<String> = Vec::new();
        for email in self.verified_emails().into_iter().chain(self.email()) {
            if !emails.iter().any(|existing| existing == email) {
                emails.push(email.to_string());
            }
        }
        emails
    }

    pub fn profile_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            login: self.login().to_string(),
            name: self.name().map(str::to_string),
            email: self.email().map(str::to_string),
            gravatar_id: self.gravatar_id().map(str::to_string),
            education: self.education,
        }
    }

    /// Persist the remote profile and reconcile the stored email set.
    ///
    /// Fails without writing anything when the remote account id differs from
    /// the one recorded for the local user.
    pub async fn run<S>(&self, store: &S) -> ServiceResult<ProfileUpdate>
    where
        S: UserStore + ?Sized,
    {
        if self.profile.id != self.user.github_id {
            tracing::error!(
                user_id = self.user.id,
                github_id = self.user.github_id,
                remote_id = self.profile.id,
                "refusing to sync user with mismatched github id"
            );
            return Err(ServiceError::UpdateFailed {
                login: self.user.login.clone(),
                reason: format!(
                    "remote account id {} does not match stored github id {}",
                    self.profile.id, self.user.github_id
                ),
            });
        }

        let update = self.profile_update();
        store.update_profile(self.user.id, &update).await?;

        let emails = self.synced_emails();
        for email in &emails {
            store.find_or_create_email(self.user.id, email).await?;
        }
        let removed = store.remove_emails_except(self.user.id, &emails).await?;

        tracing::info!(
            user_id = self.user.id,
            login = %update.login,
            emails = emails.len(),
            removed,
            "synced user"
        );

        Ok(update)
    }
}

/// GitHub reports an unset public email as either null or ""
fn present(email: Option<&str>) -> Option<&str> {
    email.filter(|e| !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::InMemoryFeatureGate;
    use crate::sync::client::StaticGithubClient;
    use crate::sync::store::InMemoryUserStore;

    fn local_user() -> LocalUser {
        LocalUser {
            id: 100,
            github_id: 500,
            login: "rkh".to_string(),
            name: Some("Konstantin Haase".to_string()),
            email: Some("konstantin.haase@gmail.com".to_string()),
            gravatar_id: Some("5c2b452f6eea4a6d84c105ebd971d2a4".to_string()),
            github_scopes: vec!["user:email".to_string()],
            education: false,
        }
    }

    fn remote_profile() -> RemoteProfile {
        RemoteProfile {
            id: 500,
            login: "rkh".to_string(),
            name: Some("Konstantin Haase".to_string()),
            gravatar_id: Some("5c2b452f6eea4a6d84c105ebd971d2a4".to_string()),
            email: Some("konstantin.haase@gmail.com".to_string()),
        }
    }

    fn account_emails() -> Vec<AccountEmail> {
        vec![
            AccountEmail::new("konstantin@Konstantins-MacBook-Air.local", false, false),
            AccountEmail::new("Konstantin.Haase@student.hpi.uni-potsdam.de", false, false),
            AccountEmail::new("rkh@7926756e-e54e-46e6-9721-ed318f58905e", false, false),
            AccountEmail::new("konstantin.mailinglists@gmail.com", true, false),
            AccountEmail::new("konstantin.mailinglists@googlemail.com", true, true),
        ]
    }

    fn without_public_email() -> RemoteProfile {
        RemoteProfile {
            email: None,
            ..remote_profile()
        }
    }

    #[test]
    fn test_profile_attributes() {
        let user = local_user();
        let info = UserInfo::new(&user, remote_profile(), account_emails());

        assert_eq!(info.login(), "rkh");
        assert_eq!(info.name(), Some("Konstantin Haase"));
        assert_eq!(info.gravatar_id(), Some("5c2b452f6eea4a6d84c105ebd971d2a4"));
        assert_eq!(info.email(), Some("konstantin.haase@gmail.com"));
        assert_eq!(
            info.verified_emails(),
            vec![
                "konstantin.mailinglists@gmail.com",
                "konstantin.mailinglists@googlemail.com"
            ]
        );
    }

    #[test]
    fn test_no_public_email_uses_primary_verified() {
        let user = local_user();
        let info = UserInfo::new(&user, without_public_email(), account_emails());
        assert_eq!(info.email(), Some("konstantin.mailinglists@googlemail.com"));
    }

    #[test]
    fn test_empty_public_email_counts_as_missing() {
        let user = local_user();
        let profile = RemoteProfile {
            email: Some(String::new()),
            ..remote_profile()
        };
        let info = UserInfo::new(&user, profile, account_emails());
        assert_eq!(info.email(), Some("konstantin.mailinglists@googlemail.com"));
    }

    #[test]
    fn test_missing_scope_falls_back_to_stored_email() {
        let mut user = local_user();
        user.github_scopes.clear();
        let info = UserInfo::new(&user, without_public_email(), account_emails());

        assert_eq!(info.email(), Some("konstantin.haase@gmail.com"));
        assert!(info.verified_emails().is_empty());
    }

    #[test]
    fn test_no_primary_email_uses_any_verified() {
        let user = local_user();
        let emails: Vec<_> = account_emails().into_iter().filter(|e| !e.primary).collect();
        let info = UserInfo::new(&user, without_public_email(), emails);
        assert_eq!(info.email(), Some("konstantin.mailinglists@gmail.com"));
    }

    #[test]
    fn test_no_verified_email_uses_stored_then_first() {
        let mut user = local_user();
        let emails: Vec<_> = account_emails().into_iter().filter(|e| !e.verified).collect();

        let info = UserInfo::new(&user, without_public_email(), emails.clone());
        assert_eq!(info.email(), Some("konstantin.haase@gmail.com"));

        user.email = None;
        let info = UserInfo::new(&user, without_public_email(), emails);
        assert_eq!(info.email(), Some("konstantin@Konstantins-MacBook-Air.local"));
    }

    #[test]
    fn test_no_email_anywhere() {
        let mut user = local_user();
        user.email = None;
        let info = UserInfo::new(&user, without_public_email(), Vec::new());
        assert_eq!(info.email(), None);
        assert!(info.synced_emails().is_empty());
    }

    #[test]
    fn test_changed_login_and_name() {
        let user = local_user();
        let profile = RemoteProfile {
            login: "RKH".to_string(),
            name: Some("RKH".to_string()),
            ..remote_profile()
        };
        let info = UserInfo::new(&user, profile, account_emails());

        assert_eq!(info.login(), "RKH");
        assert_eq!(info.name(), Some("RKH"));
    }

    #[tokio::test]
    async fn test_run_updates_profile_and_emails() {
        let user = local_user();
        let store = InMemoryUserStore::new();
        store.insert(user.clone(), Vec::new()).await;

        let info = UserInfo::new(&user, remote_profile(), account_emails()).with_education(true);
        let update = info.run(&store).await.unwrap();

        assert_eq!(
            update,
            ProfileUpdate {
                login: "rkh".to_string(),
                name: Some("Konstantin Haase".to_string()),
                email: Some("konstantin.haase@gmail.com".to_string()),
                gravatar_id: Some("5c2b452f6eea4a6d84c105ebd971d2a4".to_string()),
                education: Some(true),
            }
        );
        assert_eq!(
            store.emails(user.id).await.unwrap(),
            vec![
                "konstantin.mailinglists@gmail.com",
                "konstantin.mailinglists@googlemail.com",
                "konstantin.haase@gmail.com",
            ]
        );
        assert!(store.get(user.id).await.unwrap().user.education);
    }

    #[tokio::test]
    async fn test_run_fails_on_github_id_mismatch() {
        let mut user = local_user();
        user.github_id = 501;
        let store = InMemoryUserStore::new();
        store
            .insert(user.clone(), vec!["old@email.com".to_string()])
            .await;

        let info = UserInfo::new(&user, remote_profile(), account_emails());
        let err = info.run(&store).await.unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Updating rkh"));
        assert!(message.contains("failed"));

        let stored = store.get(user.id).await.unwrap();
        assert_eq!(stored.user, user);
        assert_eq!(stored.emails, vec!["old@email.com"]);
    }

    #[tokio::test]
    async fn test_run_removes_stale_emails() {
        let mut user = local_user();
        user.email = Some("old@email.com".to_string());
        let store = InMemoryUserStore::new();
        store
            .insert(
                user.clone(),
                vec![
                    "old@email.com".to_string(),
                    "another_old@email.com".to_string(),
                    "konstantin.mailinglists@gmail.com".to_string(),
                ],
            )
            .await;

        let info = UserInfo::new(&user, remote_profile(), account_emails());
        info.run(&store).await.unwrap();

        let stored = store.get(user.id).await.unwrap();
        assert_eq!(stored.user.email.as_deref(), Some("konstantin.haase@gmail.com"));

        let mut emails = stored.emails;
        emails.sort();
        assert_eq!(
            emails,
            vec![
                "konstantin.haase@gmail.com",
                "konstantin.mailinglists@gmail.com",
                "konstantin.mailinglists@googlemail.com",
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_respects_education_feature() {
        let user = local_user();
        let client = StaticGithubClient::new(remote_profile(), account_emails()).with_education(true);

        let gate = InMemoryFeatureGate::new();
        let info = UserInfo::fetch(&user, &client, &gate).await.unwrap();
        assert_eq!(info.education(), None);
        assert_eq!(info.profile_update().education, None);

        gate.activate(EDUCATION_DATA_SYNC, FeatureTarget::Owner(user.id))
            .unwrap();
        let info = UserInfo::fetch(&user, &client, &gate).await.unwrap();
        assert_eq!(info.education(), Some(true));
        assert_eq!(info.verified_emails().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_skips_emails_without_scope() {
        let mut user = local_user();
        user.github_scopes = vec!["public_repo".to_string()];
        let client = StaticGithubClient::new(without_public_email(), account_emails());

        let info = UserInfo::fetch(&user, &client, &InMemoryFeatureGate::new())
            .await
            .unwrap();
        assert!(info.verified_emails().is_empty());
        assert_eq!(info.email(), Some("konstantin.haase@gmail.com"));
    }
}
