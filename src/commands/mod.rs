//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod models;
pub mod utils;
pub mod validate;

// Re-export main command functions
pub use analyze::execute_analyze;
pub use models::{validate_args, AnalyzeArgs};
pub use utils::{display_schema, display_version};
pub use validate::{collect_issues, execute_validate, ValidateArgs};
