//! Trace export parsing and record definitions.
//!
//! This module handles:
//! - Reading the recorder's JSON export
//! - Deserializing the four collections into typed records
//! - Normalizing ids (float ids, implicit trace ids, null sentinels)

pub mod schema;
pub mod trace_file;

// Re-export main types
pub use schema::{ExecutionContext, Loc, Position, StaticContext, StaticTrace, Trace, TraceTag};
pub use trace_file::{parse_raw_data, parse_trace_file, RawCollections};
