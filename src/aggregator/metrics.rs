//! Calculate hot contexts and trace distribution from context stacks.
//!
//! Hot contexts are the context paths that recorded the most traces.
//! These are where most of the recorded execution happened.

use super::stack_builder::CollapsedStack;
use crate::output::report::HotContext;
use log::debug;

/// Calculate hot contexts from collapsed stacks
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Collapsed stacks from stack_builder
/// * `total_traces` - Total number of traces in the store
/// * `top_n` - Number of top stacks to return
///
/// # Returns
/// Vector of hot contexts, sorted by trace count (descending)
pub fn calculate_hot_contexts(
    stacks: &[CollapsedStack],
    total_traces: u64,
    top_n: usize,
) -> Vec<HotContext> {
    debug!(
        "Calculating top {} hot contexts from {} stacks",
        top_n,
        stacks.len()
    );

    // Stacks are already sorted by weight from stack_builder
    stacks
        .iter()
        .take(top_n)
        .map(|stack| create_hot_context(stack, total_traces))
        .collect()
}

/// Create a HotContext from a CollapsedStack
pub fn create_hot_context(stack: &CollapsedStack, total_traces: u64) -> HotContext {
    let percentage = if total_traces > 0 {
        (stack.weight as f64 / total_traces as f64) * 100.0
    } else {
        0.0
    };

    HotContext {
        stack: stack.stack.clone(),
        traces: stack.weight,
        percentage,
        context_id: stack.last_context_id,
    }
}

/// Trace distribution statistics
///
/// **Public** - returned from calculate_trace_distribution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceDistribution {
    /// Total traces across all stacks
    pub total_traces: u64,

    /// Number of unique stacks
    pub stack_count: usize,

    pub mean_traces_per_stack: u64,
    pub median_traces_per_stack: u64,

    /// Traces recorded by the heaviest 10% of stacks
    pub top_10_percent_traces: u64,

    /// Percentage of all traces in the heaviest 10%
    pub top_10_percent_percentage: f64,
}

/// Calculate trace distribution statistics
///
/// **Public** - provides summary statistics
pub fn calculate_trace_distribution(stacks: &[CollapsedStack]) -> TraceDistribution {
    if stacks.is_empty() {
        return TraceDistribution::default();
    }

    let total: u64 = stacks.iter().map(|s| s.weight).sum();
    let count = stacks.len();
    let mean = total / count as u64;

    let mut weights: Vec<u64> = stacks.iter().map(|s| s.weight).collect();
    weights.sort_unstable();
    let median = weights[weights.len() / 2];

    let top_count = (count as f64 * 0.1).ceil() as usize;
    let top_traces: u64 = stacks.iter().take(top_count).map(|s| s.weight).sum();

    TraceDistribution {
        total_traces: total,
        stack_count: count,
        mean_traces_per_stack: mean,
        median_traces_per_stack: median,
        top_10_percent_traces: top_traces,
        top_10_percent_percentage: if total > 0 {
            (top_traces as f64 / total as f64) * 100.0
        } else {
            0.0
        },
    }
}

impl TraceDistribution {
    /// Human-readable one-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Total: {} traces | Stacks: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.total_traces,
            self.stack_count,
            self.mean_traces_per_stack,
            self.median_traces_per_stack,
            self.top_10_percent_percentage
        )
    }
}
