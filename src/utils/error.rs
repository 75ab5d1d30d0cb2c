//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::store::CollectionName;
use thiserror::Error;

/// Errors that can occur while ingesting a trace export
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read trace file: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),

    #[error("Duplicate key {key} in {collection}")]
    DuplicateKey { collection: CollectionName, key: u64 },
}

/// Errors raised by queries over a loaded collection store.
///
/// Each data-integrity variant carries the key that failed so a malformed
/// trace can be diagnosed without re-running the query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Unknown column '{column}' on {collection}")]
    UnknownColumn {
        collection: CollectionName,
        column: String,
    },

    #[error("Sentinel call id 0 missing from staticTraces callId/resultCallId")]
    MissingSentinel,

    #[error("No staticTraces row has resultCallId = {call_id}")]
    MissingCallResult { call_id: u64 },

    #[error("{count} staticTraces rows have resultCallId = {call_id}, expected exactly one")]
    AmbiguousCallResult { call_id: u64, count: usize },

    #[error(
        "Trace #{trace_id} in context #{context_id} references unknown staticTraceId {static_trace_id}"
    )]
    JoinMismatch {
        context_id: u64,
        trace_id: u64,
        static_trace_id: u64,
    },

    #[error("No executionContexts row has contextId = {context_id}")]
    ContextNotFound { context_id: u64 },

    #[error("Context #{context_id} references unknown staticContextId {static_context_id}")]
    StaticContextNotFound {
        context_id: u64,
        static_context_id: u64,
    },

    #[error("parentContextId chain starting at context #{context_id} contains a cycle")]
    ContextCycle { context_id: u64 },
}

/// Errors that can occur while loading analysis configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
