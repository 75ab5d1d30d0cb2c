//! trace-lens
//!
//! Reconstructs a readable execution model from a recorded trace export:
//! which function was executing at each point, and how call sites pair
//! with their results.
//!
//! This crate provides the core implementation for the
//! `trace-lens` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! trace-lens analyze --file trace.json --flamegraph --summary
//! trace-lens validate --file trace.json
//! ```
//!
//! As a library:
//!
//! ```ignore
//! use trace_lens::aggregator::CallGraphBuilder;
//! use trace_lens::parser::parse_trace_file;
//! use trace_lens::store::CollectionStore;
//!
//! let store = CollectionStore::new(parse_trace_file("trace.json")?)?;
//! for tree in CallGraphBuilder::new(&store).static_call_trees()? {
//!     let tree = tree?;
//!     println!("{} <- {:?}", tree.call_id, tree.caller_names);
//! }
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod store;
pub mod utils;
