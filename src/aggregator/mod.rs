//! Derived views over a loaded collection store.
//!
//! This module turns the four collections into:
//! - Call-site ids and call/return groupings
//! - Context display names and context paths
//! - Trace groups per context, joined with static metadata
//! - Collapsed context stacks and hot contexts

pub mod call_graph;
pub mod context_resolver;
pub mod metrics;
pub mod stack_builder;
pub mod trace_grouper;

// Re-export main types and functions
pub use call_graph::{CallGraphBuilder, StaticCallTree, StaticCallTrees};
pub use context_resolver::ContextResolver;
pub use metrics::{calculate_hot_contexts, calculate_trace_distribution, TraceDistribution};
pub use stack_builder::{build_context_stacks, CollapsedStack};
pub use trace_grouper::{ContextTraceGroup, EnrichedTrace, StaticTraceGroup, TraceGrouper};
