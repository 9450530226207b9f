use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use build_service::{AxisModel, ConfigParser, ConfigValidator};

/// Validate a build configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the build configuration YAML file
    pub config: PathBuf,

    /// Service settings file (default: $CIBUILD_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Treat findings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let config_path = &args.config;

    if !config_path.exists() {
        color_eyre::eyre::bail!("Config file not found: {}", config_path.display());
    }

    let settings = super::load_settings(args.settings.as_deref())?;
    let registry = settings.registry();

    // Step 1: Parse YAML
    output::status("Validating", &format!("{}", config_path.display()));

    let document = match ConfigParser::parse_file(config_path) {
        Ok(document) => document,
        Err(e) => {
            output::error(&format!("Parse error: {}", e.message));
            if let Some(suggestion) = &e.suggestion {
                output::warning(&format!("Suggestion: {}", suggestion));
            }
            std::process::exit(1);
        }
    };

    output::check("YAML syntax valid");

    // Step 2: Report axes
    let model = AxisModel::new(&document, &registry);
    let axes = model.axes();
    let combinations: usize = axes.iter().map(|axis| axis.cardinality()).product();
    output::check(&format!(
        "Matrix: {} axes, {} combination(s) before exclusions",
        axes.len(),
        combinations
    ));
    for axis in &axes {
        let values: Vec<String> = axis.values.iter().map(|v| v.to_string()).collect();
        output::axis(&axis.name, &values, axis.gated);
    }
    output::check(&format!("Fixed keys: {}", model.fixed_keys().join(", ")));

    let matrix = document.matrix();
    output::check(&format!(
        "Rules: {} exclude, {} include, {} allow_failures",
        matrix.exclude.len(),
        matrix.include.len(),
        matrix.allow_failures.len()
    ));

    // Step 3: Semantic findings
    if let Err(findings) = ConfigValidator::validate(&document, &registry) {
        for finding in &findings {
            output::warning(&format!("[{}] {}", finding.path, finding.message));
            if let Some(suggestion) = &finding.suggestion {
                output::warning(&format!("  Suggestion: {}", suggestion));
            }
        }
        if args.strict {
            output::error(&format!("{} finding(s) in strict mode", findings.len()));
            std::process::exit(1);
        }
    }

    println!();
    output::success("Build configuration is valid");

    Ok(())
}
