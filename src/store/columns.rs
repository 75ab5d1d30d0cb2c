//! Column projection over typed records.
//!
//! Each record type lists its column names (the camelCase export names) and
//! maps a column name to a [`ColumnValue`].

use super::CollectionName;
use crate::parser::schema::{ExecutionContext, Loc, StaticContext, StaticTrace, Trace, TraceTag};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell value
///
/// Integers that fit in `i64` are always `Int`; `UInt` only holds ids above
/// `i64::MAX`, so each number has exactly one representation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Null,
}

impl ColumnValue {
    /// Non-negative integer value, `None` for anything else
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ColumnValue::Int(v) => u64::try_from(*v).ok(),
            ColumnValue::UInt(v) => Some(*v),
            _ => None,
        }
    }
}

// Floats compare by bit pattern so values can be deduplicated in a HashSet.
impl PartialEq for ColumnValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ColumnValue::Int(a), ColumnValue::Int(b)) => a == b,
            (ColumnValue::UInt(a), ColumnValue::UInt(b)) => a == b,
            (ColumnValue::Float(a), ColumnValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ColumnValue::Str(a), ColumnValue::Str(b)) => a == b,
            (ColumnValue::Null, ColumnValue::Null) => true,
            _ => false,
        }
    }
}

impl Eq for ColumnValue {}

impl Hash for ColumnValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ColumnValue::Int(v) => v.hash(state),
            ColumnValue::UInt(v) => v.hash(state),
            ColumnValue::Float(v) => v.to_bits().hash(state),
            ColumnValue::Str(s) => s.hash(state),
            ColumnValue::Null => {}
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Int(v) => write!(f, "{}", v),
            ColumnValue::UInt(v) => write!(f, "{}", v),
            ColumnValue::Float(v) => write!(f, "{}", v),
            ColumnValue::Str(s) => f.write_str(s),
            ColumnValue::Null => f.write_str("null"),
        }
    }
}

impl From<u64> for ColumnValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(small) => ColumnValue::Int(small),
            Err(_) => ColumnValue::UInt(v),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::Str(v.to_string())
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ColumnValue::Null)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Float(v)
    }
}

impl From<&TraceTag> for ColumnValue {
    fn from(tag: &TraceTag) -> Self {
        match tag {
            TraceTag::Code(code) => ColumnValue::Int(*code),
            TraceTag::Name(name) => ColumnValue::Str(name.clone()),
        }
    }
}

impl From<&Loc> for ColumnValue {
    fn from(loc: &Loc) -> Self {
        ColumnValue::Str(loc.to_string())
    }
}

/// A record type stored in one of the four collections
pub trait Record {
    const COLLECTION: CollectionName;
    const COLUMNS: &'static [&'static str];

    /// Unique key within the collection
    fn key(&self) -> u64;

    /// Value of the named column, `None` if the column does not exist
    fn column(&self, name: &str) -> Option<ColumnValue>;
}

impl Record for StaticContext {
    const COLLECTION: CollectionName = CollectionName::StaticContexts;
    const COLUMNS: &'static [&'static str] = &[
        "staticContextId",
        "displayName",
        "loc",
        "parentId",
        "programId",
        "type",
    ];

    fn key(&self) -> u64 {
        self.static_context_id
    }

    fn column(&self, name: &str) -> Option<ColumnValue> {
        let value: ColumnValue = match name {
            "staticContextId" => self.static_context_id.into(),
            "displayName" => self.display_name.as_str().into(),
            "loc" => self.loc.as_ref().into(),
            "parentId" => self.parent_id.into(),
            "programId" => self.program_id.into(),
            "type" => self.context_type.as_ref().into(),
            _ => return None,
        };
        Some(value)
    }
}

impl Record for StaticTrace {
    const COLLECTION: CollectionName = CollectionName::StaticTraces;
    const COLUMNS: &'static [&'static str] = &[
        "staticTraceId",
        "staticContextId",
        "callId",
        "resultCallId",
        "displayName",
        "type",
        "loc",
    ];

    fn key(&self) -> u64 {
        self.static_trace_id
    }

    fn column(&self, name: &str) -> Option<ColumnValue> {
        let value: ColumnValue = match name {
            "staticTraceId" => self.static_trace_id.into(),
            "staticContextId" => self.static_context_id.into(),
            "callId" => self.call_id.into(),
            "resultCallId" => self.result_call_id.into(),
            "displayName" => self.display_name.as_str().into(),
            "type" => self.trace_type.as_ref().into(),
            "loc" => self.loc.as_ref().into(),
            _ => return None,
        };
        Some(value)
    }
}

impl Record for ExecutionContext {
    const COLLECTION: CollectionName = CollectionName::Contexts;
    const COLUMNS: &'static [&'static str] = &[
        "contextId",
        "staticContextId",
        "parentContextId",
        "runId",
        "createdAt",
    ];

    fn key(&self) -> u64 {
        self.context_id
    }

    fn column(&self, name: &str) -> Option<ColumnValue> {
        let value: ColumnValue = match name {
            "contextId" => self.context_id.into(),
            "staticContextId" => self.static_context_id.into(),
            "parentContextId" => self.parent_context_id.into(),
            "runId" => self.run_id.into(),
            "createdAt" => self.created_at.into(),
            _ => return None,
        };
        Some(value)
    }
}

impl Record for Trace {
    const COLLECTION: CollectionName = CollectionName::Traces;
    const COLUMNS: &'static [&'static str] = &[
        "traceId",
        "contextId",
        "staticTraceId",
        "createdAt",
        "type",
        "runId",
    ];

    fn key(&self) -> u64 {
        self.trace_id
    }

    fn column(&self, name: &str) -> Option<ColumnValue> {
        let value: ColumnValue = match name {
            "traceId" => self.trace_id.into(),
            "contextId" => self.context_id.into(),
            "staticTraceId" => self.static_trace_id.into(),
            "createdAt" => self.created_at.into(),
            "type" => self.trace_type.as_ref().into(),
            "runId" => self.run_id.into(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_float_values_deduplicate() {
        let mut set = HashSet::new();
        set.insert(ColumnValue::Float(1.5));
        set.insert(ColumnValue::Float(1.5));
        set.insert(ColumnValue::Int(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_unknown_column_is_none() {
        let ctx = ExecutionContext {
            context_id: 1,
            static_context_id: 2,
            parent_context_id: None,
            run_id: None,
            created_at: None,
        };
        assert_eq!(ctx.column("staticContextId"), Some(ColumnValue::Int(2)));
        assert_eq!(ctx.column("parentContextId"), Some(ColumnValue::Null));
        assert_eq!(ctx.column("displayName"), None);
    }

    #[test]
    fn test_large_ids_keep_their_value() {
        let big = 1u64 << 63;
        let value = ColumnValue::from(big);

        assert_eq!(value, ColumnValue::UInt(big));
        assert_eq!(value.as_u64(), Some(big));
        assert_eq!(value.to_string(), "9223372036854775808");
        assert_eq!(ColumnValue::from(7u64), ColumnValue::Int(7));
        assert_eq!(ColumnValue::Int(-1).as_u64(), None);
    }
}
