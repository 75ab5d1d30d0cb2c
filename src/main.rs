//! trace-lens CLI
//!
//! Analyzes recorded execution traces: call sites, execution contexts
//! and where traces were recorded.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_lens::commands::{
    display_schema, display_version, execute_analyze, execute_validate, validate_args,
    AnalyzeArgs, ValidateArgs,
};

/// trace-lens - call-site and context analysis for recorded traces
#[derive(Parser, Debug)]
#[command(name = "trace-lens")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a trace export and write a JSON report
    Analyze {
        /// Path to the trace export (JSON)
        #[arg(short, long, env = "TRACE_LENS_FILE")]
        file: PathBuf,

        /// Output path for JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also write an SVG flamegraph of the context hierarchy
        #[arg(long, num_args = 0..=1, default_missing_value = "flamegraph.svg")]
        flamegraph: Option<PathBuf>,

        /// Number of hot contexts to include
        #[arg(long)]
        top_contexts: Option<usize>,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long)]
        width: Option<usize>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Analysis config file (TOML)
        #[arg(short, long, env = "TRACE_LENS_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Check a trace export for broken relationships
    Validate {
        /// Path to the trace export (JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Analysis config file (TOML)
        #[arg(short, long, env = "TRACE_LENS_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Display report schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            file,
            output,
            flamegraph,
            top_contexts,
            title,
            width,
            summary,
            config,
        } => {
            let args = AnalyzeArgs {
                input: file,
                output_json: output,
                output_svg: flamegraph,
                top_contexts,
                title,
                width,
                print_summary: summary,
                config_path: config,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Validate { file, config } => {
            execute_validate(ValidateArgs {
                input: file,
                config_path: config,
            })?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
