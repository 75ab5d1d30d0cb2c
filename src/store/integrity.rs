//! Whole-store relationship checks.
//!
//! Queries fail on the first broken relationship they need. This module
//! instead scans everything and reports every issue, which is what the
//! `validate` command prints.

use super::{CollectionStore, Selection};
use crate::utils::config::{IntegrityConfig, NO_CALL_ID};
use crate::utils::error::QueryError;
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A single broken relationship in a trace export
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// A relationship a query would fail on
    Query {
        #[serde(serialize_with = "serialize_display")]
        error: QueryError,
    },

    /// A static trace whose staticContextId has no StaticContext row
    OrphanStaticTrace {
        static_trace_id: u64,
        static_context_id: u64,
    },
}

impl From<QueryError> for IntegrityIssue {
    fn from(error: QueryError) -> Self {
        IntegrityIssue::Query { error }
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::Query { error } => write!(f, "{}", error),
            IntegrityIssue::OrphanStaticTrace {
                static_trace_id,
                static_context_id,
            } => write!(
                f,
                "Static trace #{} references unknown staticContextId {}",
                static_trace_id, static_context_id
            ),
        }
    }
}

fn serialize_display<S: serde::Serializer>(
    error: &QueryError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Check every relationship the queries depend on
///
/// **Public** - backs the `validate` command
///
/// # Returns
/// All issues found, in check order (contexts, traces, static traces, calls)
pub fn check_integrity(store: &CollectionStore, config: &IntegrityConfig) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    check_contexts(store, &mut issues);
    check_traces(store, &mut issues);
    check_static_traces(store, &mut issues);
    check_calls(store, config, &mut issues);

    debug!("Integrity check found {} issues", issues.len());
    issues
}

fn check_contexts(store: &CollectionStore, issues: &mut Vec<IntegrityIssue>) {
    for context in store.contexts() {
        if store.static_context(context.static_context_id).is_none() {
            issues.push(
                QueryError::StaticContextNotFound {
                    context_id: context.context_id,
                    static_context_id: context.static_context_id,
                }
                .into(),
            );
        }

        if let Some(parent_id) = context.parent_context_id {
            if store.context(parent_id).is_none() {
                issues.push(QueryError::ContextNotFound { context_id: parent_id }.into());
            }
        }
    }
}

fn check_traces(store: &CollectionStore, issues: &mut Vec<IntegrityIssue>) {
    let mut missing_contexts = BTreeSet::new();

    for trace in store.traces() {
        if store.context(trace.context_id).is_none() {
            missing_contexts.insert(trace.context_id);
        }

        if store.static_trace(trace.static_trace_id).is_none() {
            issues.push(
                QueryError::JoinMismatch {
                    context_id: trace.context_id,
                    trace_id: trace.trace_id,
                    static_trace_id: trace.static_trace_id,
                }
                .into(),
            );
        }
    }

    // one issue per missing context, not per trace
    for context_id in missing_contexts {
        issues.push(QueryError::ContextNotFound { context_id }.into());
    }
}

fn check_static_traces(store: &CollectionStore, issues: &mut Vec<IntegrityIssue>) {
    for row in store.static_traces() {
        if store.static_context(row.static_context_id).is_none() {
            issues.push(IntegrityIssue::OrphanStaticTrace {
                static_trace_id: row.static_trace_id,
                static_context_id: row.static_context_id,
            });
        }
    }
}

fn check_calls(store: &CollectionStore, config: &IntegrityConfig, issues: &mut Vec<IntegrityIssue>) {
    if store.static_traces().is_empty() {
        return;
    }

    let has_sentinel = store
        .static_traces()
        .iter()
        .any(|row| row.call_id == NO_CALL_ID || row.result_call_id == NO_CALL_ID);
    if !has_sentinel {
        issues.push(QueryError::MissingSentinel.into());
    }

    let call_ids: BTreeSet<u64> = store
        .static_traces()
        .iter()
        .flat_map(|row| [row.call_id, row.result_call_id])
        .filter(|&id| id != NO_CALL_ID)
        .collect();

    for call_id in call_ids {
        match store.static_trace_result(call_id) {
            Selection::One(_) => {}
            Selection::None => issues.push(QueryError::MissingCallResult { call_id }.into()),
            Selection::Many { count, .. } => {
                if !config.allow_ambiguous_results {
                    issues.push(QueryError::AmbiguousCallResult { call_id, count }.into());
                }
            }
        }
    }
}
