//! The collection store and its projection queries.

use super::columns::{ColumnValue, Record};
use super::{select_one, CollectionName, Selection};
use crate::parser::schema::{ExecutionContext, StaticContext, StaticTrace, Trace};
use crate::parser::RawCollections;
use crate::utils::error::{ParseError, QueryError};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Borrowed view of one collection
#[derive(Debug, Clone, Copy)]
pub enum Collection<'a> {
    StaticContexts(&'a [StaticContext]),
    StaticTraces(&'a [StaticTrace]),
    Contexts(&'a [ExecutionContext]),
    Traces(&'a [Trace]),
}

impl Collection<'_> {
    pub fn name(&self) -> CollectionName {
        match self {
            Collection::StaticContexts(_) => CollectionName::StaticContexts,
            Collection::StaticTraces(_) => CollectionName::StaticTraces,
            Collection::Contexts(_) => CollectionName::Contexts,
            Collection::Traces(_) => CollectionName::Traces,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::StaticContexts(rows) => rows.len(),
            Collection::StaticTraces(rows) => rows.len(),
            Collection::Contexts(rows) => rows.len(),
            Collection::Traces(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Collection::StaticContexts(_) => StaticContext::COLUMNS,
            Collection::StaticTraces(_) => StaticTrace::COLUMNS,
            Collection::Contexts(_) => ExecutionContext::COLUMNS,
            Collection::Traces(_) => Trace::COLUMNS,
        }
    }
}

/// Immutable store of the four collections.
///
/// Keys are checked for uniqueness once at construction; key lookups go
/// through indexes built at the same time.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    static_contexts: Vec<StaticContext>,
    static_traces: Vec<StaticTrace>,
    contexts: Vec<ExecutionContext>,
    traces: Vec<Trace>,

    static_context_index: HashMap<u64, usize>,
    static_trace_index: HashMap<u64, usize>,
    context_index: HashMap<u64, usize>,
}

impl CollectionStore {
    /// Build the store from ingested collections
    ///
    /// # Errors
    /// * `ParseError::DuplicateKey` - A key appears twice in its collection
    pub fn new(raw: RawCollections) -> Result<Self, ParseError> {
        let static_context_index = build_index(&raw.static_contexts)?;
        let static_trace_index = build_index(&raw.static_traces)?;
        let context_index = build_index(&raw.contexts)?;
        // trace ids are implicit, but a duplicate still means a broken export
        build_index(&raw.traces)?;

        debug!("Collection store ready ({} rows)", raw.total_rows());

        Ok(Self {
            static_contexts: raw.static_contexts,
            static_traces: raw.static_traces,
            contexts: raw.contexts,
            traces: raw.traces,
            static_context_index,
            static_trace_index,
            context_index,
        })
    }

    pub fn static_contexts(&self) -> &[StaticContext] {
        &self.static_contexts
    }

    pub fn static_traces(&self) -> &[StaticTrace] {
        &self.static_traces
    }

    pub fn contexts(&self) -> &[ExecutionContext] {
        &self.contexts
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// The named collection
    pub fn get_collection(&self, name: CollectionName) -> Collection<'_> {
        match name {
            CollectionName::StaticContexts => Collection::StaticContexts(&self.static_contexts),
            CollectionName::StaticTraces => Collection::StaticTraces(&self.static_traces),
            CollectionName::Contexts => Collection::Contexts(&self.contexts),
            CollectionName::Traces => Collection::Traces(&self.traces),
        }
    }

    /// The collection with the given textual name
    ///
    /// # Errors
    /// * `QueryError::UnknownCollection` - Name is not one of the four collections
    pub fn get_collection_by_name(&self, name: &str) -> Result<Collection<'_>, QueryError> {
        Ok(self.get_collection(name.parse()?))
    }

    /// Distinct values of one column across all rows of a collection.
    ///
    /// Each value appears exactly once. The result is in first-seen order,
    /// which callers should not rely on.
    ///
    /// # Errors
    /// * `QueryError::UnknownColumn` - Column does not exist on that collection
    pub fn get_unique_column_values(
        &self,
        collection: CollectionName,
        column: &str,
    ) -> Result<Vec<ColumnValue>, QueryError> {
        let rows = self.get_collection(collection);
        if !rows.columns().iter().any(|c| *c == column) {
            return Err(QueryError::UnknownColumn {
                collection,
                column: column.to_string(),
            });
        }

        let values = match rows {
            Collection::StaticContexts(rows) => unique_values(rows, column),
            Collection::StaticTraces(rows) => unique_values(rows, column),
            Collection::Contexts(rows) => unique_values(rows, column),
            Collection::Traces(rows) => unique_values(rows, column),
        };
        Ok(values)
    }

    /// StaticContext row by key
    pub fn static_context(&self, static_context_id: u64) -> Option<&StaticContext> {
        self.static_context_index
            .get(&static_context_id)
            .map(|&i| &self.static_contexts[i])
    }

    /// StaticTrace row by key
    pub fn static_trace(&self, static_trace_id: u64) -> Option<&StaticTrace> {
        self.static_trace_index
            .get(&static_trace_id)
            .map(|&i| &self.static_traces[i])
    }

    /// ExecutionContext row by key
    pub fn context(&self, context_id: u64) -> Option<&ExecutionContext> {
        self.context_index
            .get(&context_id)
            .map(|&i| &self.contexts[i])
    }

    /// StaticTrace rows whose `callId` equals `call_id`, in row order
    pub fn static_traces_calling(&self, call_id: u64) -> impl Iterator<Item = &StaticTrace> {
        self.static_traces
            .iter()
            .filter(move |row| row.call_id == call_id)
    }

    /// StaticTrace row(s) whose `resultCallId` equals `call_id`
    pub fn static_trace_result(&self, call_id: u64) -> Selection<'_, StaticTrace> {
        select_one(&self.static_traces, |row| row.result_call_id == call_id)
    }
}

/// Map each key to its row position, rejecting duplicates
///
/// **Private** - internal helper for CollectionStore::new
fn build_index<T: Record>(rows: &[T]) -> Result<HashMap<u64, usize>, ParseError> {
    let mut index = HashMap::with_capacity(rows.len());
    for (position, row) in rows.iter().enumerate() {
        if index.insert(row.key(), position).is_some() {
            return Err(ParseError::DuplicateKey {
                collection: T::COLLECTION,
                key: row.key(),
            });
        }
    }
    Ok(index)
}

fn unique_values<T: Record>(rows: &[T], column: &str) -> Vec<ColumnValue> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for row in rows {
        if let Some(value) = row.column(column) {
            if seen.insert(value.clone()) {
                values.push(value);
            }
        }
    }
    values
}
