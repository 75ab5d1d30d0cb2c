//! Call-site identifiers and call/return groupings.
//!
//! Every static trace may name a call site it invokes (`callId`) and a call
//! site whose return it records (`resultCallId`). Pairing the two sides per
//! call site gives "who calls this site" and "what the site looks like when
//! it returns". Assembling a full tree from these pairs is left to callers.

use crate::parser::schema::StaticTrace;
use crate::store::{CollectionName, CollectionStore, ColumnValue, Selection};
use crate::utils::config::{IntegrityConfig, NO_CALL_ID};
use crate::utils::error::QueryError;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;

/// One call site with its callers and its result trace point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticCallTree<'a> {
    pub call_id: u64,

    /// `displayName` of every static trace with this `callId`, in row order
    pub caller_names: Vec<&'a str>,

    /// The static trace with this `resultCallId`
    pub result: &'a StaticTrace,
}

/// Derives call-site groupings from a collection store
#[derive(Debug, Clone, Copy)]
pub struct CallGraphBuilder<'a> {
    store: &'a CollectionStore,
    config: IntegrityConfig,
}

impl<'a> CallGraphBuilder<'a> {
    pub fn new(store: &'a CollectionStore) -> Self {
        Self {
            store,
            config: IntegrityConfig::default(),
        }
    }

    pub fn with_config(mut self, config: IntegrityConfig) -> Self {
        self.config = config;
        self
    }

    /// Distinct non-sentinel call ids, ascending
    ///
    /// **Public** - union of `callId` and `resultCallId` without 0
    ///
    /// # Errors
    /// * `QueryError::MissingSentinel` - No row uses the sentinel, so the
    ///   export does not follow the expected format
    pub fn unique_static_call_ids(&self) -> Result<Vec<u64>, QueryError> {
        let mut ids: BTreeSet<u64> = BTreeSet::new();
        for column in ["callId", "resultCallId"] {
            let values = self
                .store
                .get_unique_column_values(CollectionName::StaticTraces, column)?;
            ids.extend(values.iter().filter_map(ColumnValue::as_u64));
        }

        if !ids.remove(&NO_CALL_ID) {
            return Err(QueryError::MissingSentinel);
        }

        debug!("Found {} distinct call ids", ids.len());
        Ok(ids.into_iter().collect())
    }

    /// Call trees, one per call id in ascending order
    ///
    /// The returned iterator is lazy; each item fails independently with
    /// `MissingCallResult` or `AmbiguousCallResult`. Call again to restart.
    ///
    /// # Errors
    /// * `QueryError::MissingSentinel` - From [`Self::unique_static_call_ids`]
    pub fn static_call_trees(&self) -> Result<StaticCallTrees<'a>, QueryError> {
        let call_ids = self.unique_static_call_ids()?;
        Ok(StaticCallTrees {
            store: self.store,
            config: self.config,
            call_ids: call_ids.into_iter(),
        })
    }

    /// Call tree for a single call id
    pub fn static_call_tree(&self, call_id: u64) -> Result<StaticCallTree<'a>, QueryError> {
        build_call_tree(self.store, self.config, call_id)
    }
}

/// Lazy sequence of [`StaticCallTree`]s
#[derive(Debug, Clone)]
pub struct StaticCallTrees<'a> {
    store: &'a CollectionStore,
    config: IntegrityConfig,
    call_ids: std::vec::IntoIter<u64>,
}

impl<'a> Iterator for StaticCallTrees<'a> {
    type Item = Result<StaticCallTree<'a>, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        let call_id = self.call_ids.next()?;
        Some(build_call_tree(self.store, self.config, call_id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.call_ids.size_hint()
    }
}

impl ExactSizeIterator for StaticCallTrees<'_> {}

fn build_call_tree(
    store: &CollectionStore,
    config: IntegrityConfig,
    call_id: u64,
) -> Result<StaticCallTree<'_>, QueryError> {
    let caller_names: Vec<&str> = store
        .static_traces_calling(call_id)
        .map(|row| row.display_name.as_str())
        .collect();

    let result = match store.static_trace_result(call_id) {
        Selection::One(row) => row,
        Selection::None => return Err(QueryError::MissingCallResult { call_id }),
        Selection::Many { first, count } => {
            if !config.allow_ambiguous_results {
                return Err(QueryError::AmbiguousCallResult { call_id, count });
            }
            warn!(
                "{} result rows for call id {}, using staticTraceId {}",
                count, call_id, first.static_trace_id
            );
            first
        }
    };

    Ok(StaticCallTree {
        call_id,
        caller_names,
        result,
    })
}
