//! Runtime context id to static display name.

use crate::parser::schema::{ExecutionContext, StaticContext};
use crate::store::CollectionStore;
use crate::utils::error::QueryError;
use std::collections::HashSet;

/// Resolves execution contexts against their static definitions.
///
/// Holds no cache: every call re-resolves through the store's key indexes.
#[derive(Debug, Clone, Copy)]
pub struct ContextResolver<'a> {
    store: &'a CollectionStore,
}

impl<'a> ContextResolver<'a> {
    pub fn new(store: &'a CollectionStore) -> Self {
        Self { store }
    }

    /// Display name of the static context behind a runtime context
    ///
    /// # Errors
    /// * `QueryError::ContextNotFound` - No ExecutionContext with this id
    /// * `QueryError::StaticContextNotFound` - Its staticContextId is unknown
    pub fn context_display_name(&self, context_id: u64) -> Result<&'a str, QueryError> {
        let static_context = self.static_context_of(context_id)?;
        Ok(static_context.display_name.as_str())
    }

    /// The static definition behind a runtime context
    pub fn static_context_of(&self, context_id: u64) -> Result<&'a StaticContext, QueryError> {
        let context = self.context(context_id)?;
        self.store
            .static_context(context.static_context_id)
            .ok_or(QueryError::StaticContextNotFound {
                context_id,
                static_context_id: context.static_context_id,
            })
    }

    /// Follow `parentContextId` links up to the root context
    ///
    /// # Errors
    /// * `QueryError::ContextNotFound` - The context or one of its ancestors is missing
    /// * `QueryError::ContextCycle` - The parent chain loops
    pub fn root_context_id(&self, context_id: u64) -> Result<u64, QueryError> {
        let chain = self.ancestry(context_id)?;
        Ok(chain.last().map(|c| c.context_id).unwrap_or(context_id))
    }

    /// Display names from the root context down to `context_id`
    pub fn context_path(&self, context_id: u64) -> Result<Vec<&'a str>, QueryError> {
        self.ancestry(context_id)?
            .iter()
            .rev()
            .map(|context| self.context_display_name(context.context_id))
            .collect()
    }

    /// The context followed by its ancestors, nearest first
    fn ancestry(&self, context_id: u64) -> Result<Vec<&'a ExecutionContext>, QueryError> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(context_id);

        while let Some(id) = current {
            if !visited.insert(id) {
                return Err(QueryError::ContextCycle { context_id });
            }
            let context = self.context(id)?;
            chain.push(context);
            current = context.parent_context_id;
        }

        Ok(chain)
    }

    fn context(&self, context_id: u64) -> Result<&'a ExecutionContext, QueryError> {
        self.store
            .context(context_id)
            .ok_or(QueryError::ContextNotFound { context_id })
    }
}
