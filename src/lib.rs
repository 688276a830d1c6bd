//! agentprof
//!
//! Attributes CPU sampling profiles to an instrumentation agent and
//! aggregates the agent's share of the samples into a call tree.
//!
//! This crate provides the core implementation for the
//! `agentprof` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! jfr print --json --events jdk.ExecutionSample recording.jfr > samples.json
//! agentprof analyze samples.json
//! ```
//!
//! The library can also be driven directly:
//!
//! ```ignore
//! let samples = parser::parse_jfr_json(&raw, false)?;
//! let report = aggregator::analyze(&samples, AnalysisConfig::default())?;
//! print!("{}", output::report_to_string(&report, &ReportOptions::default())?);
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
