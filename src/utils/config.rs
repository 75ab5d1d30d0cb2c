//! Configuration and constants for the CLI.
//!
//! Constants live here; the optional `analysis.toml` file is parsed into
//! [`AnalysisConfig`] by [`load_config`].

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current output schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Sentinel used by `callId`/`resultCallId` for "not part of a call"
pub const NO_CALL_ID: u64 = 0;

// Collection keys as written by the trace recorder
pub const STATIC_CONTEXTS_KEY: &str = "staticContexts";
pub const STATIC_TRACES_KEY: &str = "staticTraces";
pub const CONTEXTS_KEY: &str = "contexts";
pub const EXECUTION_CONTEXTS_KEY: &str = "executionContexts";
pub const TRACES_KEY: &str = "traces";

/// Some exports nest all collections under one of these keys
pub const WRAPPER_FIELD_NAMES: &[&str] = &["collections", "data"];

pub const DEFAULT_TOP_CONTEXTS: usize = 20;
pub const MAX_TOP_CONTEXTS: usize = 1000;
pub const DEFAULT_FLAMEGRAPH_TITLE: &str = "Execution Contexts";
pub const DEFAULT_FLAMEGRAPH_WIDTH: usize = 1200;

/// Complete analysis configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub flamegraph: FlamegraphSettings,

    #[serde(default)]
    pub integrity: IntegrityConfig,
}

/// What goes into the JSON report
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of hot contexts to include
    pub top_contexts: usize,

    /// Include per-call-site trees
    pub include_call_trees: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_contexts: DEFAULT_TOP_CONTEXTS,
            include_call_trees: true,
        }
    }
}

/// Flamegraph settings as they appear in the config file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlamegraphSettings {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_FLAMEGRAPH_TITLE.to_string(),
            width: DEFAULT_FLAMEGRAPH_WIDTH,
        }
    }
}

/// Relationship checks that may be relaxed for older trace formats
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Accept the first of several rows sharing a `resultCallId`
    pub allow_ambiguous_results: bool,
}

/// Load analysis configuration from a TOML file
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::ParseFailed` - If TOML is invalid
/// * `ConfigError::Invalid` - If values are out of range
///
/// # Example
/// ```ignore
/// let config = load_config("analysis.toml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(contents: &str) -> Result<AnalysisConfig, ConfigError> {
    let config: AnalysisConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.top_contexts == 0 {
            return Err(ConfigError::Invalid(
                "report.top_contexts must be greater than 0".to_string(),
            ));
        }
        if self.report.top_contexts > MAX_TOP_CONTEXTS {
            return Err(ConfigError::Invalid(format!(
                "report.top_contexts is too large (max {})",
                MAX_TOP_CONTEXTS
            )));
        }
        if self.flamegraph.width == 0 {
            return Err(ConfigError::Invalid(
                "flamegraph.width must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.report.top_contexts, DEFAULT_TOP_CONTEXTS);
        assert!(config.report.include_call_trees);
        assert_eq!(config.flamegraph.width, DEFAULT_FLAMEGRAPH_WIDTH);
        assert!(!config.integrity.allow_ambiguous_results);
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
            [report]
            top_contexts = 5

            [integrity]
            allow_ambiguous_results = true
            "#,
        )
        .unwrap();

        assert_eq!(config.report.top_contexts, 5);
        assert!(config.report.include_call_trees);
        assert_eq!(config.flamegraph.title, DEFAULT_FLAMEGRAPH_TITLE);
        assert!(config.integrity.allow_ambiguous_results);
    }

    #[test]
    fn test_zero_top_contexts_rejected() {
        let result = parse_config("[report]\ntop_contexts = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = parse_config("[report\n");
        assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
    }
}
