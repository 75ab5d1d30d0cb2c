//! Build collapsed stack format from the runtime context hierarchy.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "main;handleRequest;parseBody 12"
//! This means: 12 traces were recorded in a `parseBody` context entered from
//! `handleRequest`, itself entered from `main`.

use super::context_resolver::ContextResolver;
use crate::store::CollectionStore;
use crate::utils::error::QueryError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single collapsed stack entry
///
/// **Public** - used by flamegraph generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapsedStack {
    /// Context names as semicolon-separated string
    pub stack: String,

    /// Number of traces recorded under this stack
    pub weight: u64,

    /// Last context id that produced this stack
    pub last_context_id: Option<u64>,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    ///
    /// **Public** - constructor
    pub fn new(stack: String, weight: u64, last_context_id: Option<u64>) -> Self {
        Self {
            stack,
            weight,
            last_context_id,
        }
    }

    /// Innermost frame of the stack
    pub fn leaf(&self) -> &str {
        self.stack.rsplit(';').next().unwrap_or(&self.stack)
    }

    /// Render as a collapsed-stack line ("a;b;c 12")
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from the traces in a store
///
/// **Public** - main entry point for stack building
///
/// # Returns
/// One collapsed stack per distinct root-to-context path, heaviest first
///
/// # Algorithm
/// 1. Walk through traces
/// 2. Resolve each trace's context path (root first), once per context
/// 3. Aggregate by unique stack (count traces)
///
/// # Errors
/// Any resolution failure of a trace's context chain
pub fn build_context_stacks(store: &CollectionStore) -> Result<Vec<CollapsedStack>, QueryError> {
    debug!("Building context stacks from {} traces", store.traces().len());

    let resolver = ContextResolver::new(store);

    // context id -> rendered stack
    let mut paths: HashMap<u64, String> = HashMap::new();
    // stack -> (weight, last context id)
    let mut stack_map: HashMap<String, (u64, u64)> = HashMap::new();

    for trace in store.traces() {
        let stack = match paths.get(&trace.context_id) {
            Some(stack) => stack.clone(),
            None => {
                let names = resolver.context_path(trace.context_id)?;
                let stack = render_stack(&names);
                paths.insert(trace.context_id, stack.clone());
                stack
            }
        };

        let entry = stack_map.entry(stack).or_insert((0, trace.context_id));
        entry.0 += 1;
        entry.1 = trace.context_id;
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, (weight, context_id))| CollapsedStack::new(stack, weight, Some(context_id)))
        .collect();

    // heaviest first, ties by name so output is stable
    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));
    debug!("Built {} unique context stacks", stacks.len());

    Ok(stacks)
}

/// Join frame names, keeping the separator out of the names themselves
fn render_stack(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                "(anonymous)".to_string()
            } else {
                name.replace(';', ",")
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_stack_to_line() {
        let stack = CollapsedStack::new("main;execute;read".to_string(), 12, None);
        assert_eq!(stack.to_line(), "main;execute;read 12");
        assert_eq!(stack.leaf(), "read");
    }

    #[test]
    fn test_render_stack_sanitizes_names() {
        assert_eq!(render_stack(&["main", "a;b", " "]), "main;a,b;(anonymous)");
    }
}
