use crate::output;

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use build_service::{ConfigParser, FeatureGate, JobConfig, MatrixExpander};

/// Expand a build configuration into its job matrix
#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Path to the build configuration YAML file
    pub config: PathBuf,

    /// Id of the repository that owns the build (scopes feature flags)
    #[arg(long, default_value_t = 0)]
    pub repo: u64,

    /// Service settings file (default: $CIBUILD_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Output format for the job list
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Enable the os axis feature for every repository during this run
    #[arg(long)]
    pub multi_os: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

pub fn execute(args: ExpandArgs) -> Result<()> {
    if !args.config.exists() {
        color_eyre::eyre::bail!("Config file not found: {}", args.config.display());
    }

    let settings = super::load_settings(args.settings.as_deref())?;
    let expander = MatrixExpander::new(settings.registry());
    let gate = settings.feature_gate()?;
    if args.multi_os {
        gate.enable_for_all(&expander.registry().gated().feature)?;
    }

    output::status("Expanding", &format!("{}", args.config.display()));
    let document = ConfigParser::parse_file(&args.config)
        .map_err(|e| color_eyre::eyre::eyre!("Parse error: {}", e))?;

    let placeholders = document.matrix().placeholder_count();
    if placeholders > 0 {
        output::warning(&format!("{} placeholder matrix entries ignored", placeholders));
    }

    let jobs = expand(&expander, &document, args.repo, &gate)?;
    print_jobs(&jobs, args.format)?;

    output::success(&format!(
        "{} job(s), {} allowed to fail{}",
        jobs.len(),
        jobs.iter().filter(|job| job.allow_failure).count(),
        if document.matrix().fast_finish {
            ", fast finish"
        } else {
            ""
        }
    ));

    Ok(())
}

fn expand(
    expander: &MatrixExpander,
    document: &build_service::ConfigDocument,
    repo: u64,
    gate: &dyn FeatureGate,
) -> Result<Vec<JobConfig>> {
    expander
        .expand(document, repo, gate)
        .wrap_err_with(|| format!("failed to expand build matrix for repository {}", repo))
}

fn print_jobs(jobs: &[JobConfig], format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(jobs)?,
        OutputFormat::Json => serde_json::to_string_pretty(jobs)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
