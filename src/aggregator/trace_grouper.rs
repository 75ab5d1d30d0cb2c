//! Runtime traces grouped by owning context, joined with static metadata.

use super::context_resolver::ContextResolver;
use crate::parser::schema::{millis_to_utc, StaticTrace, Trace, TraceTag};
use crate::store::CollectionStore;
use crate::utils::error::QueryError;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// A trace joined with its static trace point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTrace<'a> {
    #[serde(flatten)]
    pub trace: &'a Trace,

    /// `displayName` of the static trace
    pub static_display_name: &'a str,

    /// `type` of the static trace (renamed to keep it apart from the dynamic type)
    pub static_type: Option<&'a TraceTag>,
}

impl EnrichedTrace<'_> {
    /// Dynamic type if one was recorded, otherwise the static type
    pub fn effective_type(&self) -> Option<&TraceTag> {
        self.trace.trace_type.as_ref().or(self.static_type)
    }
}

/// All traces recorded in one execution context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextTraceGroup<'a> {
    pub context_id: u64,
    pub context_name: &'a str,
    pub rows: Vec<EnrichedTrace<'a>>,
}

impl<'a> ContextTraceGroup<'a> {
    pub fn first(&self) -> Option<&EnrichedTrace<'a>> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&EnrichedTrace<'a>> {
        self.rows.last()
    }

    /// Earliest `createdAt` in the group
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.created_at_bounds().map(|(start, _)| start)
    }

    /// Time between the earliest and latest `createdAt`
    pub fn duration(&self) -> Option<Duration> {
        self.created_at_bounds().map(|(start, end)| end - start)
    }

    fn created_at_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut stamps = self.rows.iter().filter_map(|row| row.trace.created_at);
        let first = stamps.next()?;
        let (min, max) = stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some((millis_to_utc(min)?, millis_to_utc(max)?))
    }
}

/// Static traces of one static context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticTraceGroup<'a> {
    pub static_context_id: u64,
    pub rows: Vec<&'a StaticTrace>,
}

/// Groups trace collections for reporting
#[derive(Debug, Clone, Copy)]
pub struct TraceGrouper<'a> {
    store: &'a CollectionStore,
    resolver: ContextResolver<'a>,
}

impl<'a> TraceGrouper<'a> {
    pub fn new(store: &'a CollectionStore) -> Self {
        Self {
            store,
            resolver: ContextResolver::new(store),
        }
    }

    /// Traces grouped by `contextId`, ascending, each joined with its static trace
    ///
    /// Rows keep their collection order within a group.
    ///
    /// # Errors
    /// * `QueryError::JoinMismatch` - A trace's staticTraceId has no StaticTrace row
    /// * `QueryError::ContextNotFound` / `StaticContextNotFound` - The group's
    ///   context name cannot be resolved
    pub fn group_traces_by_context(&self) -> Result<Vec<ContextTraceGroup<'a>>, QueryError> {
        let mut partitions: BTreeMap<u64, Vec<&'a Trace>> = BTreeMap::new();
        for trace in self.store.traces() {
            partitions.entry(trace.context_id).or_default().push(trace);
        }

        debug!(
            "Grouping {} traces into {} contexts",
            self.store.traces().len(),
            partitions.len()
        );

        partitions
            .into_iter()
            .map(|(context_id, traces)| self.enrich_group(context_id, traces))
            .collect()
    }

    /// Static traces grouped by `staticContextId`, ascending
    pub fn group_static_traces_by_static_context(&self) -> Vec<StaticTraceGroup<'a>> {
        let mut partitions: BTreeMap<u64, Vec<&'a StaticTrace>> = BTreeMap::new();
        for row in self.store.static_traces() {
            partitions.entry(row.static_context_id).or_default().push(row);
        }

        partitions
            .into_iter()
            .map(|(static_context_id, rows)| StaticTraceGroup {
                static_context_id,
                rows,
            })
            .collect()
    }

    fn enrich_group(
        &self,
        context_id: u64,
        traces: Vec<&'a Trace>,
    ) -> Result<ContextTraceGroup<'a>, QueryError> {
        let rows = traces
            .into_iter()
            .map(|trace| self.join_static(trace))
            .collect::<Result<Vec<_>, _>>()?;

        let context_name = self.resolver.context_display_name(context_id)?;

        Ok(ContextTraceGroup {
            context_id,
            context_name,
            rows,
        })
    }

    fn join_static(&self, trace: &'a Trace) -> Result<EnrichedTrace<'a>, QueryError> {
        let static_trace = self.store.static_trace(trace.static_trace_id).ok_or(
            QueryError::JoinMismatch {
                context_id: trace.context_id,
                trace_id: trace.trace_id,
                static_trace_id: trace.static_trace_id,
            },
        )?;

        Ok(EnrichedTrace {
            trace,
            static_display_name: &static_trace.display_name,
            static_type: static_trace.trace_type.as_ref(),
        })
    }
}
