//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads the trace export into a collection store
//! 2. Builds collapsed context stacks
//! 3. Builds the analysis report (call sites, contexts, hot contexts)
//! 4. Generates the flamegraph
//! 5. Writes output files

use super::models::{flamegraph_config, AnalyzeArgs};
use crate::aggregator::{build_context_stacks, calculate_trace_distribution};
use crate::flamegraph::{generate_flamegraph, generate_text_summary};
use crate::output::{build_report, render_report_summary, write_report, write_svg, AnalysisReport};
use crate::parser::parse_trace_file;
use crate::store::CollectionStore;
use crate::utils::config::{load_config, AnalysisConfig};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// The report that was written
///
/// # Errors
/// * Config or trace file cannot be read
/// * A relationship the report depends on is broken
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalysisReport> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.input.display());
    let config = effective_config(&args)?;

    // Step 1: Load collections
    info!("Step 1/5: Loading trace collections...");
    let store = load_store(&args.input)?;

    // Step 2: Build collapsed stacks
    info!("Step 2/5: Building context stacks...");
    let stacks = build_context_stacks(&store).context("Failed to build context stacks")?;

    let distribution = calculate_trace_distribution(&stacks);
    info!("Trace distribution: {}", distribution.summary());

    // Step 3: Build report
    info!(
        "Step 3/5: Building report (top {} contexts)...",
        config.report.top_contexts
    );
    let source = args.input.display().to_string();
    let report =
        build_report(&store, &source, &stacks, &config).context("Failed to build analysis report")?;

    debug!("Top 3 hot contexts:");
    for (i, hot) in report.hot_contexts.iter().take(3).enumerate() {
        debug!(
            "  {}. {} traces ({:.1}%): {}",
            i + 1,
            hot.traces,
            hot.percentage,
            hot.stack
        );
    }

    // Step 4: Generate flamegraph (if requested)
    let svg_content = if args.output_svg.is_some() {
        info!("Step 4/5: Generating flamegraph...");
        let svg = generate_flamegraph(&stacks, Some(&flamegraph_config(&config)))
            .context("Failed to generate flamegraph")?;
        Some(svg)
    } else {
        info!("Step 4/5: Skipping flamegraph generation (not requested)");
        None
    };

    // Step 5: Write outputs
    info!("Step 5/5: Writing output files...");
    write_report(&report, &args.output_json).context("Failed to write report JSON")?;
    info!("✓ Report written to: {}", args.output_json.display());

    if let (Some(svg), Some(svg_path)) = (svg_content, &args.output_svg) {
        write_svg(&svg, svg_path).context("Failed to write flamegraph SVG")?;
        info!("✓ Flamegraph written to: {}", svg_path.display());
    }

    if args.print_summary {
        println!("{}", render_report_summary(&report));
        if !stacks.is_empty() {
            println!("{}", generate_text_summary(&stacks, 10, distribution.total_traces));
        }
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Config file (or defaults) with CLI overrides applied
///
/// **Private** - internal helper for execute_analyze
fn effective_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let base = match &args.config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let config = args.merge_into(base);
    config.validate().context("Invalid analysis configuration")?;
    Ok(config)
}

/// Parse the trace file and index it
///
/// **Private** - shared by analyze and validate
pub(crate) fn load_store(input: &Path) -> Result<CollectionStore> {
    let raw = parse_trace_file(input)
        .with_context(|| format!("Failed to parse trace file {}", input.display()))?;

    debug!("Loaded {} rows", raw.total_rows());

    CollectionStore::new(raw).context("Failed to index trace collections")
}
