pub mod expand;
pub mod sync_user;
pub mod validate;

use std::path::Path;

use build_service::ServiceSettings;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;

/// Load settings from `--settings`, falling back to `CIBUILD_CONFIG` and then defaults
pub fn load_settings(path: Option<&Path>) -> Result<ServiceSettings> {
    match path {
        Some(path) => ServiceSettings::load(path)
            .wrap_err_with(|| format!("failed to load settings from {}", path.display())),
        None => ServiceSettings::load_from_env().wrap_err("failed to load settings"),
    }
}
