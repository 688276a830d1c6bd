//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads the capture file
//! 2. Decodes it into samples
//! 3. Classifies samples and builds the call tree
//! 4. Writes the report

use super::models::AnalyzeArgs;
use crate::aggregator::{analyze, load_policy, AnalysisConfig, AnalysisReport, ClassifierPolicy};
use crate::output::write_report;
use crate::parser::{decode_samples, InputFormat};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Execute the analyze command, printing the report to stdout
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable or undecodable capture
/// * Invalid policy file
/// * Call tree invariant violation
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute_analyze_to(&args, &mut out)
}

/// Execute the analyze command, writing the report to `out`
pub fn execute_analyze_to<W: Write>(args: &AnalyzeArgs, out: &mut W) -> Result<()> {
    let start_time = Instant::now();

    let report = run_analysis(args)?;

    info!("Step 4/4: Writing report...");
    write_report(&report, &args.report, out).context("Failed to write report")?;

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());
    Ok(())
}

/// Run steps 1-3 and return the finished report
///
/// **Public** - used by execute_analyze and by tests
pub fn run_analysis(args: &AnalyzeArgs) -> Result<AnalysisReport> {
    info!("Starting analysis of: {}", args.input.display());

    // Step 1: Read capture
    info!("Step 1/4: Reading capture...");
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read capture {}", args.input.display()))?;

    // Step 2: Decode
    let format = args
        .format
        .unwrap_or_else(|| InputFormat::detect(&args.input, &raw));
    info!("Step 2/4: Decoding {} capture...", format);
    let samples = decode_samples(format, &raw, args.include_native)
        .context("Failed to decode capture")?;

    if samples.is_empty() {
        warn!("Capture contains no samples");
    }
    debug!(
        "Decoded {} stacks carrying {} samples",
        samples.len(),
        samples.iter().map(|s| s.weight).sum::<u64>()
    );

    // Step 3: Classify and aggregate
    info!("Step 3/4: Classifying samples ({:?} mode)...", args.mode);
    let config = build_config(args)?;
    let report = analyze(&samples, config).context("Call tree failed verification")?;

    if let Some(window) = &report.window {
        info!(
            "Recording window: {} .. {} ({:.1}s)",
            window.start,
            window.end,
            window.duration_secs()
        );
    }

    Ok(report)
}

/// Resolve the policy file and flag overrides into a run configuration
pub fn build_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut policy = match &args.policy {
        Some(path) => load_policy(path)
            .with_context(|| format!("Failed to load policy {}", path.display()))?,
        None => ClassifierPolicy::default(),
    };

    if let Some(prefix) = &args.instrumentation_prefix {
        policy = policy.with_instrumentation_prefix(prefix.clone());
    }
    if let Some(prefix) = &args.self_exclusion_prefix {
        policy = policy.with_self_exclusion_prefix(prefix.clone());
    }
    policy.validate().context("Invalid classifier policy")?;

    Ok(AnalysisConfig {
        include_line_number: args.include_line_number,
        exclude_class_loading: args.exclude_class_loading,
        mode: args.mode,
        policy,
    })
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if args.input.is_dir() {
        anyhow::bail!("Input path is a directory: {}", args.input.display());
    }

    if let Some(policy) = &args.policy {
        check_file(policy)?;
    }

    if args.report.min_count == 0 {
        anyhow::bail!("min_count must be greater than 0");
    }

    Ok(())
}

fn check_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("Policy file not found: {}", path.display());
    }
    Ok(())
}

/// Render the effective policy as TOML
///
/// **Public** - backs the `policy` subcommand
pub fn render_policy(path: Option<&Path>) -> Result<String> {
    let policy = match path {
        Some(path) => load_policy(path)
            .with_context(|| format!("Failed to load policy {}", path.display()))?,
        None => ClassifierPolicy::default(),
    };
    policy.to_toml().context("Failed to render policy")
}
