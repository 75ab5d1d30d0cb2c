//! Analysis report: the JSON document written by `trace-lens analyze`.
//!
//! The report is an owned snapshot of the derived views, so it can be
//! written, read back and compared without the store that produced it.

use crate::aggregator::{
    calculate_hot_contexts, CallGraphBuilder, CollapsedStack, StaticCallTree, TraceGrouper,
};
use crate::store::CollectionStore;
use crate::utils::config::{AnalysisConfig, REPORT_SCHEMA_VERSION};
use crate::utils::error::QueryError;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// Complete analysis report
///
/// **Public** - serialized by `output::json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Report schema version
    pub version: String,

    /// Trace file the report was built from
    pub source_file: String,

    /// RFC 3339 timestamp
    pub generated_at: String,

    pub counts: CollectionCounts,

    /// Distinct call-site ids, ascending, sentinel removed
    pub call_ids: Vec<u64>,

    /// One entry per call id, omitted when disabled in the config
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_trees: Vec<CallTreeEntry>,

    /// Per-context trace summary, ascending by context id
    pub contexts: Vec<ContextSummary>,

    pub hot_contexts: Vec<HotContext>,
}

/// Row counts of the four collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionCounts {
    pub static_contexts: usize,
    pub static_traces: usize,
    pub contexts: usize,
    pub traces: usize,
}

impl CollectionCounts {
    pub fn from_store(store: &CollectionStore) -> Self {
        Self {
            static_contexts: store.static_contexts().len(),
            static_traces: store.static_traces().len(),
            contexts: store.contexts().len(),
            traces: store.traces().len(),
        }
    }
}

/// Owned form of a call tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTreeEntry {
    pub call_id: u64,
    pub callers: Vec<String>,
    pub result_static_trace_id: u64,
    pub result_display_name: String,
}

impl From<&StaticCallTree<'_>> for CallTreeEntry {
    fn from(tree: &StaticCallTree<'_>) -> Self {
        Self {
            call_id: tree.call_id,
            callers: tree.caller_names.iter().map(|n| n.to_string()).collect(),
            result_static_trace_id: tree.result.static_trace_id,
            result_display_name: tree.result.display_name.clone(),
        }
    }
}

/// Traces recorded in one execution context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub context_id: u64,
    pub display_name: String,
    pub trace_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Milliseconds between the first and last trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

/// A context path that recorded many traces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotContext {
    /// Context names, root first, semicolon-separated
    pub stack: String,

    /// Traces recorded under this path
    pub traces: u64,

    /// Share of all traces
    pub percentage: f64,

    /// A context that produced this path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<u64>,
}

/// Build a report from a loaded store
///
/// **Public** - called by the analyze command after stacks are built
///
/// # Arguments
/// * `store` - Loaded collections
/// * `source_file` - Shown in the report as-is
/// * `stacks` - Collapsed context stacks, heaviest first
/// * `config` - Report and integrity settings
///
/// # Errors
/// The first query failure from call ids, call trees or context grouping
pub fn build_report(
    store: &CollectionStore,
    source_file: &str,
    stacks: &[CollapsedStack],
    config: &AnalysisConfig,
) -> Result<AnalysisReport, QueryError> {
    let call_graph = CallGraphBuilder::new(store).with_config(config.integrity);
    let call_ids = call_graph.unique_static_call_ids()?;

    let call_trees = if config.report.include_call_trees {
        call_graph
            .static_call_trees()?
            .map(|tree| tree.map(|t| CallTreeEntry::from(&t)))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };

    let contexts = TraceGrouper::new(store)
        .group_traces_by_context()?
        .iter()
        .map(|group| ContextSummary {
            context_id: group.context_id,
            display_name: group.context_name.to_string(),
            trace_count: group.rows.len(),
            started_at: group.started_at(),
            duration_ms: group.duration().map(|d| d.num_milliseconds()),
        })
        .collect::<Vec<_>>();

    let total_traces = store.traces().len() as u64;
    let hot_contexts = calculate_hot_contexts(stacks, total_traces, config.report.top_contexts);

    debug!(
        "Report: {} call ids, {} call trees, {} contexts, {} hot contexts",
        call_ids.len(),
        call_trees.len(),
        contexts.len(),
        hot_contexts.len()
    );

    Ok(AnalysisReport {
        version: REPORT_SCHEMA_VERSION.to_string(),
        source_file: source_file.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        counts: CollectionCounts::from_store(store),
        call_ids,
        call_trees,
        contexts,
        hot_contexts,
    })
}
