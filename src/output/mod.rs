//! Output writers for analysis reports and flamegraphs.
//!
//! This module handles writing data to disk:
//! - JSON analysis reports
//! - SVG flamegraphs
//! - Terminal summaries

pub mod json;
pub mod report;
pub mod svg;
pub mod terminal;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report};
pub use report::{build_report, AnalysisReport, CallTreeEntry, ContextSummary, HotContext};
pub use svg::write_svg;
pub use terminal::{render_integrity, render_report_summary};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Validate that an output path is writable
///
/// **Public** - used by the writers and by argument validation
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty or names a directory
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Validate the path and create missing parent directories
///
/// **Private** - internal helper for the writers
fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    validate_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

/// File size in bytes, 0 if unknown
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
