//! Flamegraph rendering of collapsed context stacks.
//!
//! Converts collapsed stacks into SVG flamegraphs and terminal summaries.
//! The flamegraph shows where in the context hierarchy traces were recorded.

pub mod generator;

// Re-export main types
pub use generator::{generate_flamegraph, generate_text_summary, FlamegraphConfig};
