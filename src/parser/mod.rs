//! Input adapters and the decoder-independent sample model.
//!
//! This module handles:
//! - Defining the abstract `StackTrace` / `StackFrame` shape
//! - Decoding `jfr print --json` output
//! - Decoding folded stack files
//! - Detecting which adapter a capture needs

pub mod collapsed;
pub mod jfr_json;
pub mod schema;

// Re-export main types
pub use collapsed::parse_collapsed;
pub use jfr_json::parse_jfr_json;
pub use schema::{ResolvedFrame, StackFrame, StackTrace};

use crate::utils::config::{COLLAPSED_EXTENSIONS, JSON_EXTENSIONS};
use crate::utils::error::ParseError;
use clap::ValueEnum;
use log::debug;
use std::fmt;
use std::path::Path;

/// Supported capture formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// JSON from `jfr print --json`
    JfrJson,
    /// Folded stacks, `frame;frame;... count`
    Collapsed,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::JfrJson => write!(f, "jfr-json"),
            InputFormat::Collapsed => write!(f, "collapsed"),
        }
    }
}

impl InputFormat {
    /// Guess the format from the file extension, then from the content
    ///
    /// **Public** - used when `--format` is not given
    pub fn detect(path: &Path, content: &str) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        if let Some(ext) = extension.as_deref() {
            if JSON_EXTENSIONS.contains(&ext) {
                return InputFormat::JfrJson;
            }
            if COLLAPSED_EXTENSIONS.contains(&ext) {
                return InputFormat::Collapsed;
            }
        }

        let first = content.trim_start().chars().next();
        let format = if matches!(first, Some('{') | Some('[')) {
            InputFormat::JfrJson
        } else {
            InputFormat::Collapsed
        };
        debug!("Detected input format from content: {}", format);
        format
    }
}

/// Decode a capture with the given adapter
///
/// **Public** - main entry point for decoding
///
/// # Arguments
/// * `format` - Adapter to use
/// * `raw` - Capture contents
/// * `include_native` - Keep native method samples (JFR only)
pub fn decode_samples(
    format: InputFormat,
    raw: &str,
    include_native: bool,
) -> Result<Vec<StackTrace>, ParseError> {
    match format {
        InputFormat::JfrJson => parse_jfr_json(raw, include_native),
        InputFormat::Collapsed => parse_collapsed(raw),
    }
}
