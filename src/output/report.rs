//! Plain text report writer.
//!
//! Layout:
//! ```text
//! Total Samples: 1200
//! Total Glowroot: 96 (8.00%)
//!
//!  96 com.app.Servlet.service() line: 20
//!    90 org.glowroot.agent.impl.Transaction.start() line: 30
//! ```
//! Two spaces of indent per depth, counts right-aligned to width 3.

use crate::aggregator::{AnalysisReport, Node, Summary};
use crate::utils::error::OutputError;
use std::io::Write;

/// Limits on the tree dump; totals are never affected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Deepest level printed, 0 being the root's children
    pub max_depth: Option<usize>,

    /// Nodes with fewer samples are omitted with their subtrees
    pub min_count: u64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_count: 1,
        }
    }
}

/// Write the full report
///
/// **Public** - main entry point for report output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error on the writer
pub fn write_report<W: Write>(
    report: &AnalysisReport,
    options: &ReportOptions,
    out: &mut W,
) -> Result<(), OutputError> {
    write_summary(&report.summary, &report.label, out)?;
    writeln!(out)?;

    for child in report.tree.root().ordered_children() {
        write_node(child, 0, options, out)?;
    }

    out.flush()?;
    Ok(())
}

/// Write the two total lines
pub fn write_summary<W: Write>(
    summary: &Summary,
    label: &str,
    out: &mut W,
) -> Result<(), OutputError> {
    writeln!(out, "Total Samples: {}", summary.total_samples)?;
    writeln!(
        out,
        "Total {}: {} ({})",
        label,
        summary.attributed_samples,
        format_percentage(summary)
    )?;
    Ok(())
}

/// `12.34%`, or `n/a` for an empty capture
pub fn format_percentage(summary: &Summary) -> String {
    match summary.percentage() {
        Some(percentage) => format!("{:.2}%", percentage),
        None => "n/a".to_string(),
    }
}

fn write_node<W: Write>(
    node: &Node,
    depth: usize,
    options: &ReportOptions,
    out: &mut W,
) -> Result<(), OutputError> {
    if node.count() < options.min_count || options.max_depth.is_some_and(|max| depth > max) {
        return Ok(());
    }

    writeln!(out, "{}{:>3} {}", "  ".repeat(depth), node.count(), node.key())?;

    for child in node.ordered_children() {
        write_node(child, depth + 1, options, out)?;
    }
    Ok(())
}

/// Render the report into a string (for testing or in-memory use)
pub fn report_to_string(
    report: &AnalysisReport,
    options: &ReportOptions,
) -> Result<String, OutputError> {
    let mut buffer = Vec::new();
    write_report(report, options, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
