//! Validate command implementation.
//!
//! Loads a trace export and reports every broken relationship between its
//! collections.

use super::analyze::load_store;
use crate::output::render_integrity;
use crate::store::{check_integrity, IntegrityIssue};
use crate::utils::config::{load_config, IntegrityConfig};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Arguments for the validate command
#[derive(Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Recorded trace export to check
    pub input: PathBuf,

    /// Optional `analysis.toml` (only `[integrity]` is used)
    pub config_path: Option<PathBuf>,
}

/// Check a trace file and print the results
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * The file cannot be loaded
/// * At least one integrity issue was found
pub fn execute_validate(args: ValidateArgs) -> Result<()> {
    let issues = collect_issues(&args)?;

    print!("{}", render_integrity(&args.input.display().to_string(), &issues));

    if !issues.is_empty() {
        anyhow::bail!(
            "{} failed validation with {} issue(s)",
            args.input.display(),
            issues.len()
        );
    }

    Ok(())
}

/// Run the integrity checker without printing
///
/// **Public** - used by execute_validate and tests
pub fn collect_issues(args: &ValidateArgs) -> Result<Vec<IntegrityIssue>> {
    let config = integrity_config(args.config_path.as_deref())?;
    let store = load_store(&args.input)?;

    let issues = check_integrity(&store, &config);
    info!("Integrity check found {} issue(s)", issues.len());

    Ok(issues)
}

fn integrity_config(path: Option<&Path>) -> Result<IntegrityConfig> {
    match path {
        Some(path) => Ok(load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
            .integrity),
        None => Ok(IntegrityConfig::default()),
    }
}
