use crate::aggregator::ClassifierMode;
use crate::output::ReportOptions;
use crate::parser::InputFormat;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Capture to analyze
    pub input: PathBuf,

    /// Adapter to decode the capture with (None = detect)
    pub format: Option<InputFormat>,

    /// Keep `jdk.NativeMethodSample` events
    pub include_native: bool,

    /// Classifier policy file (None = built-in defaults)
    pub policy: Option<PathBuf>,

    /// Overrides the policy's instrumentation prefix
    pub instrumentation_prefix: Option<String>,

    /// Overrides the policy's self-exclusion prefix
    pub self_exclusion_prefix: Option<String>,

    /// One or two passes
    pub mode: ClassifierMode,

    /// Append line numbers to frame keys
    pub include_line_number: bool,

    /// Drop samples that run through class loading
    pub exclude_class_loading: bool,

    /// Tree dump limits
    pub report: ReportOptions,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("profile.json"),
            format: None,
            include_native: false,
            policy: None,
            instrumentation_prefix: None,
            self_exclusion_prefix: None,
            mode: ClassifierMode::default(),
            include_line_number: true,
            exclude_class_loading: false,
            report: ReportOptions::default(),
        }
    }
}
