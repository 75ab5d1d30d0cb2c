//! Record types for the four collections of a trace export.
//!
//! Field names follow the recorder's camelCase JSON; the Rust side uses
//! snake_case. Identifier columns go through [`de_id`] because some exports
//! write integers as floats (`5.0`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A line/column position in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

/// Source range of a static context or trace point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Loc {
    #[serde(default)]
    pub start: Position,
    #[serde(default)]
    pub end: Position,
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// Trace point type tag.
///
/// Recorders write either the numeric enum value or its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceTag {
    Code(i64),
    Name(String),
}

impl fmt::Display for TraceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceTag::Code(code) => write!(f, "{}", code),
            TraceTag::Name(name) => f.write_str(name),
        }
    }
}

/// A statically-known function or scope definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticContext {
    #[serde(deserialize_with = "de_id")]
    pub static_context_id: u64,

    #[serde(default)]
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Loc>,

    /// Enclosing static context, if nested
    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,

    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub program_id: Option<u64>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub context_type: Option<TraceTag>,
}

/// A statically-known call site or trace point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticTrace {
    #[serde(deserialize_with = "de_id")]
    pub static_trace_id: u64,

    #[serde(deserialize_with = "de_id")]
    pub static_context_id: u64,

    /// Call site this trace point invokes (0 = none)
    #[serde(default, deserialize_with = "de_id_or_sentinel")]
    pub call_id: u64,

    /// Call site whose return this trace point records (0 = none)
    #[serde(default, deserialize_with = "de_id_or_sentinel")]
    pub result_call_id: u64,

    #[serde(default)]
    pub display_name: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub trace_type: Option<TraceTag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Loc>,
}

/// A runtime activation of a static context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    #[serde(deserialize_with = "de_id")]
    pub context_id: u64,

    #[serde(deserialize_with = "de_id")]
    pub static_context_id: u64,

    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub parent_context_id: Option<u64>,

    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub run_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
}

/// A runtime occurrence of a static trace point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// Implicit in most exports; the parser assigns the row's export slot
    #[serde(default, deserialize_with = "de_id_or_sentinel")]
    pub trace_id: u64,

    #[serde(deserialize_with = "de_id")]
    pub context_id: u64,

    #[serde(deserialize_with = "de_id")]
    pub static_trace_id: u64,

    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,

    /// Dynamic type, overriding the static trace's type when present
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub trace_type: Option<TraceTag>,

    #[serde(default, deserialize_with = "de_opt_id", skip_serializing_if = "Option::is_none")]
    pub run_id: Option<u64>,
}

impl Trace {
    /// Recording time as a UTC timestamp
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.and_then(millis_to_utc)
    }
}

/// Convert recorder epoch milliseconds to a UTC timestamp
pub fn millis_to_utc(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}

// ============================================================================
// Identifier deserialization
// ============================================================================

fn value_to_id<E: serde::de::Error>(value: &serde_json::Value) -> Result<u64, E> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    if let Some(f) = value.as_f64() {
        if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
            return Ok(f as u64);
        }
    }
    Err(E::custom(format!(
        "expected a non-negative integer id, found {}",
        value
    )))
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    value_to_id(&value)
}

/// `null` maps to the "no call" sentinel
fn de_id_or_sentinel<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        Ok(0)
    } else {
        value_to_id(&value)
    }
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        Ok(None)
    } else {
        value_to_id(&value).map(Some)
    }
}
