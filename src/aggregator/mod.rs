//! Attribution of samples to the instrumentation agent.
//!
//! This module transforms decoded samples into:
//! - Frame keys (canonical frame identity)
//! - Classification verdicts (skip, or the depth attribution starts at)
//! - A call tree counting samples per distinct path
//! - Run totals and the attribution percentage

pub mod call_tree;
pub mod classifier;
pub mod frame_key;
pub mod metrics;
pub mod policy;
pub mod session;

// Re-export main types and functions
pub use call_tree::{CallTree, Node};
pub use classifier::{
    BoundaryMarkers, BoundaryRule, ClassifierMode, FrameClassifier, SkipReason, Verdict,
};
pub use frame_key::{FrameKey, FrameKeyFormatter};
pub use metrics::{RecordingWindow, SessionStats, Summary};
pub use policy::{load_policy, ClassifierPolicy};
pub use session::{analyze, AnalysisConfig, AnalysisReport, AnalysisSession};
