//! JSON report output writer.
//!
//! Writes AnalysisReport structs to JSON files with proper formatting.

use super::report::AnalysisReport;
use super::{calculate_file_size, prepare_output_path};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a report to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `report` - Report data to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let report = build_report(&store, "trace.json", &stacks, &config)?;
/// write_report(&report, "report.json")?;
/// ```
pub fn write_report(report: &AnalysisReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());
    prepare_output_path(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, report).map_err(OutputError::SerializationFailed)?;

    info!(
        "Report written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Serialize a report to a pretty JSON string
pub fn report_to_string(report: &AnalysisReport) -> Result<String, OutputError> {
    serde_json::to_string_pretty(report).map_err(OutputError::SerializationFailed)
}

/// Read a report from a JSON file
///
/// **Public** - useful for comparing runs and testing
///
/// # Errors
/// * `OutputError::ReadFailed` - File cannot be opened
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report(input_path: impl AsRef<Path>) -> Result<AnalysisReport, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(|source| OutputError::ReadFailed {
        path: input_path.display().to_string(),
        source,
    })?;
    let report: AnalysisReport =
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Report loaded: version {}, source {}",
        report.version, report.source_file
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::{CollectionCounts, HotContext};
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn create_test_report() -> AnalysisReport {
        AnalysisReport {
            version: "1.0.0".to_string(),
            source_file: "trace.json".to_string(),
            generated_at: "2024-01-01T00:00:00+00:00".to_string(),
            counts: CollectionCounts {
                static_contexts: 2,
                static_traces: 3,
                contexts: 2,
                traces: 4,
            },
            call_ids: vec![5],
            call_trees: Vec::new(),
            contexts: Vec::new(),
            hot_contexts: vec![HotContext {
                stack: "main;foo".to_string(),
                traces: 3,
                percentage: 75.0,
                context_id: Some(2),
            }],
        }
    }

    #[test]
    fn test_write_and_read_report() {
        let report = create_test_report();
        let temp_file = NamedTempFile::new().unwrap();

        write_report(&report, temp_file.path()).unwrap();
        let loaded = read_report(temp_file.path()).unwrap();

        assert_eq!(loaded, report);
    }

    #[test]
    fn test_empty_call_trees_omitted() {
        let json = report_to_string(&create_test_report()).unwrap();
        assert!(!json.contains("call_trees"));
        assert!(json.contains("\"hot_contexts\""));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/report.json");

        write_report(&create_test_report(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = read_report(temp_dir.path().join("missing.json"));
        let err = result.unwrap_err();
        assert!(matches!(err, OutputError::ReadFailed { .. }));
        assert!(err.to_string().starts_with("Failed to read "));
        assert!(err.to_string().contains("missing.json"));
    }
}
