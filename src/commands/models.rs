use crate::flamegraph::FlamegraphConfig;
use crate::output::validate_path;
use crate::utils::config::{AnalysisConfig, MAX_TOP_CONTEXTS};
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Recorded trace export to analyze
    pub input: PathBuf,

    /// Output path for JSON report
    pub output_json: PathBuf,

    /// Output path for SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Number of hot contexts to include; falls back to the config file
    pub top_contexts: Option<usize>,

    /// Flamegraph title; falls back to the config file
    pub title: Option<String>,

    /// Flamegraph width in pixels; falls back to the config file
    pub width: Option<usize>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Optional `analysis.toml`
    pub config_path: Option<PathBuf>,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_json: PathBuf::from("report.json"),
            output_svg: None,
            top_contexts: None,
            title: None,
            width: None,
            print_summary: false,
            config_path: None,
        }
    }
}

impl AnalyzeArgs {
    /// Apply CLI overrides on top of a loaded config
    pub fn merge_into(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(top) = self.top_contexts {
            config.report.top_contexts = top;
        }
        if let Some(title) = &self.title {
            config.flamegraph.title = title.clone();
        }
        if let Some(width) = self.width {
            config.flamegraph.width = width;
        }
        config
    }
}

/// Flamegraph settings from the effective config
pub fn flamegraph_config(config: &AnalysisConfig) -> FlamegraphConfig {
    FlamegraphConfig::new()
        .with_title(config.flamegraph.title.clone())
        .with_width(config.flamegraph.width)
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &AnalyzeArgs) -> anyhow::Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input trace file cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input trace file not found: {}", args.input.display());
    }

    validate_path(&args.output_json)?;
    if let Some(svg) = &args.output_svg {
        validate_path(svg)?;
    }

    if let Some(top) = args.top_contexts {
        if top == 0 {
            anyhow::bail!("top_contexts must be greater than 0");
        }
        if top > MAX_TOP_CONTEXTS {
            anyhow::bail!("top_contexts is too large (max {})", MAX_TOP_CONTEXTS);
        }
    }

    if args.width == Some(0) {
        anyhow::bail!("width must be greater than 0");
    }

    Ok(())
}
