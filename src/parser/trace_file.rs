//! Main parser for recorded trace exports.
//!
//! Turns the raw JSON written by the trace recorder into the four typed
//! collections. Row-level problems are logged and skipped; structural
//! problems fail the whole parse.

use super::schema::{ExecutionContext, StaticContext, StaticTrace, Trace};
use crate::utils::config::{
    CONTEXTS_KEY, EXECUTION_CONTEXTS_KEY, STATIC_CONTEXTS_KEY, STATIC_TRACES_KEY, TRACES_KEY,
    WRAPPER_FIELD_NAMES,
};
use crate::utils::error::ParseError;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The four collections as produced by ingestion, in export row order
#[derive(Debug, Clone, Default)]
pub struct RawCollections {
    pub static_contexts: Vec<StaticContext>,
    pub static_traces: Vec<StaticTrace>,
    pub contexts: Vec<ExecutionContext>,
    pub traces: Vec<Trace>,
}

impl RawCollections {
    /// Total number of records across all collections
    pub fn total_rows(&self) -> usize {
        self.static_contexts.len() + self.static_traces.len() + self.contexts.len() + self.traces.len()
    }
}

/// Read and parse a trace export from disk
///
/// **Public** - main entry point for ingestion
///
/// # Errors
/// * `ParseError::Io` - File cannot be opened
/// * `ParseError::JsonError` - File is not valid JSON
/// * `ParseError::InvalidFormat` - JSON does not have the export shape
pub fn parse_trace_file(path: impl AsRef<Path>) -> Result<RawCollections, ParseError> {
    let path = path.as_ref();
    info!("Reading trace file: {}", path.display());

    let file = File::open(path)?;
    let raw: Value = serde_json::from_reader(BufReader::new(file))?;

    parse_raw_data(&raw)
}

/// Parse an already-loaded trace export
///
/// # Arguments
/// * `raw` - JSON object keyed by collection name
///
/// # Returns
/// Typed collections ready for [`crate::store::CollectionStore::new`]
pub fn parse_raw_data(raw: &Value) -> Result<RawCollections, ParseError> {
    let root = locate_collections(raw)?;

    for key in root.keys() {
        if !is_known_collection(key) {
            debug!("Ignoring collection '{}'", key);
        }
    }

    let static_contexts = without_slots(parse_collection(root, &[STATIC_CONTEXTS_KEY])?);
    let static_traces = without_slots(parse_collection(root, &[STATIC_TRACES_KEY])?);
    let contexts = without_slots(parse_collection(root, &[EXECUTION_CONTEXTS_KEY, CONTEXTS_KEY])?);
    let traces = assign_implicit_trace_ids(parse_collection(root, &[TRACES_KEY])?);

    let collections = RawCollections {
        static_contexts,
        static_traces,
        contexts,
        traces,
    };

    debug!(
        "Parsed {} static contexts, {} static traces, {} contexts, {} traces",
        collections.static_contexts.len(),
        collections.static_traces.len(),
        collections.contexts.len(),
        collections.traces.len()
    );

    Ok(collections)
}

/// Find the object holding the collection arrays
///
/// **Private** - internal helper for parse_raw_data
fn locate_collections(raw: &Value) -> Result<&Map<String, Value>, ParseError> {
    let obj = raw.as_object().ok_or_else(|| {
        ParseError::InvalidFormat("Trace export must be a JSON object".to_string())
    })?;

    if obj.keys().any(|k| is_known_collection(k)) {
        return Ok(obj);
    }

    for field in WRAPPER_FIELD_NAMES {
        if let Some(inner) = obj.get(*field).and_then(Value::as_object) {
            debug!("Collections nested under '{}'", field);
            return Ok(inner);
        }
    }

    Err(ParseError::InvalidFormat(
        "No known collections found in trace export".to_string(),
    ))
}

fn is_known_collection(key: &str) -> bool {
    matches!(
        key,
        STATIC_CONTEXTS_KEY | STATIC_TRACES_KEY | EXECUTION_CONTEXTS_KEY | CONTEXTS_KEY | TRACES_KEY
    )
}

/// Parse the first present alias of a collection
///
/// **Private** - internal extraction logic
fn parse_collection<T: DeserializeOwned>(
    root: &Map<String, Value>,
    aliases: &[&str],
) -> Result<Vec<(u64, T)>, ParseError> {
    let Some((name, value)) = aliases
        .iter()
        .find_map(|alias| root.get(*alias).map(|v| (*alias, v)))
    else {
        warn!("Collection '{}' missing from trace export", aliases[0]);
        return Ok(Vec::new());
    };

    let rows = value.as_array().ok_or_else(|| {
        ParseError::InvalidFormat(format!("Collection '{}' must be an array", name))
    })?;

    parse_rows(name, rows)
}

/// Parse array of records, skipping null slots and malformed rows
///
/// Each record is paired with its slot in the export. Slot 0 is reserved by
/// the recorder, so an array without the leading null starts at slot 1.
///
/// **Private** - internal parsing logic
fn parse_rows<T: DeserializeOwned>(name: &str, rows: &[Value]) -> Result<Vec<(u64, T)>, ParseError> {
    let mut parsed = Vec::with_capacity(rows.len());
    let mut attempted = 0usize;
    let first_slot = match rows.first() {
        Some(Value::Null) | None => 0,
        Some(_) => 1,
    };

    for (index, row) in rows.iter().enumerate() {
        if row.is_null() {
            continue;
        }
        attempted += 1;

        match T::deserialize(row) {
            Ok(record) => parsed.push((index as u64 + first_slot, record)),
            Err(e) => {
                warn!("Failed to parse {} row {}: {}", name, index, e);
            }
        }
    }

    if parsed.is_empty() && attempted > 0 {
        return Err(ParseError::InvalidFormat(format!(
            "All {} rows of '{}' failed to parse",
            attempted, name
        )));
    }

    Ok(parsed)
}

fn without_slots<T>(rows: Vec<(u64, T)>) -> Vec<T> {
    rows.into_iter().map(|(_, record)| record).collect()
}

/// Give traces without a recorded id their slot in the export
///
/// **Private** - internal helper for parse_raw_data
fn assign_implicit_trace_ids(rows: Vec<(u64, Trace)>) -> Vec<Trace> {
    rows.into_iter()
        .map(|(slot, mut trace)| {
            if trace.trace_id == 0 {
                trace.trace_id = slot;
            }
            trace
        })
        .collect()
}
