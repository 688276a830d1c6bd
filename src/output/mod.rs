//! Report output.
//!
//! Writes the totals and the indented call tree to any `io::Write`.

pub mod report;

// Re-export main functions
pub use report::{format_percentage, report_to_string, write_report, write_summary, ReportOptions};
