//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod models;

// Re-export main command functions
pub use analyze::{
    build_config, execute_analyze, execute_analyze_to, render_policy, run_analysis, validate_args,
};
pub use models::AnalyzeArgs;
