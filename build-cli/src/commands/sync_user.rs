use crate::output;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use build_service::{
    AccountEmail, InMemoryUserStore, LocalUser, ProfileUpdate, RemoteProfile,
    StaticGithubClient, UserInfo, UserStore,
};

/// Reconcile a user record against recorded remote API responses
#[derive(Args, Debug)]
pub struct SyncUserArgs {
    /// JSON file holding the local user record
    #[arg(long, value_name = "FILE")]
    pub user: PathBuf,

    /// JSON file holding recorded responses: {"user": {...}, "emails": [...], "education": false}
    #[arg(long, value_name = "FILE")]
    pub remote: PathBuf,

    /// Email already recorded for the user (can be repeated)
    #[arg(long = "email", value_name = "ADDRESS")]
    pub emails: Vec<String>,

    /// Service settings file (default: $CIBUILD_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RecordedRemote {
    user: RemoteProfile,
    #[serde(default)]
    emails: Vec<AccountEmail>,
    #[serde(default)]
    education: bool,
}

#[derive(Debug, Serialize)]
struct SyncReport {
    update: ProfileUpdate,
    emails: Vec<String>,
}

pub async fn execute(args: SyncUserArgs) -> Result<()> {
    let user: LocalUser = read_json(&args.user)?;
    let remote: RecordedRemote = read_json(&args.remote)?;

    let settings = super::load_settings(args.settings.as_deref())?;
    let gate = settings.feature_gate()?;

    let client =
        StaticGithubClient::new(remote.user, remote.emails).with_education(remote.education);
    let store = InMemoryUserStore::new();
    store.insert(user.clone(), args.emails.clone()).await;

    output::status("Syncing", &user.login);
    let info = UserInfo::fetch(&user, &client, &gate).await?;
    let update = match info.run(&store).await {
        Ok(update) => update,
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let report = SyncReport {
        update,
        emails: store.emails(user.id).await?,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    output::success(&format!("{} synced", report.update.login));

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("invalid JSON in {}", path.display()))
}
