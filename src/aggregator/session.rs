//! One analysis run: classifier, call tree and counters owned together.
//!
//! A session is built per capture. Nothing is shared between sessions, so
//! several analyses can run in one process without affecting each other.

use super::call_tree::CallTree;
use super::classifier::{BoundaryMarkers, ClassifierMode, FrameClassifier, SkipReason, Verdict};
use super::frame_key::FrameKeyFormatter;
use super::metrics::{RecordingWindow, SessionStats, Summary};
use super::policy::ClassifierPolicy;
use crate::parser::StackTrace;
use crate::utils::error::AnalysisError;
use log::{debug, info};

/// Run-wide switches
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Append ` line: <n>` to frame keys
    pub include_line_number: bool,

    /// Drop samples whose kept path runs through class loading
    pub exclude_class_loading: bool,

    /// One or two passes
    pub mode: ClassifierMode,

    /// Frame-shape heuristics
    pub policy: ClassifierPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_line_number: true,
            exclude_class_loading: false,
            mode: ClassifierMode::default(),
            policy: ClassifierPolicy::default(),
        }
    }
}

/// Finished, read-only result of a run
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub tree: CallTree,
    pub summary: Summary,
    pub stats: SessionStats,
    pub label: String,
    pub window: Option<RecordingWindow>,
}

/// Mutable state of a run in progress
#[derive(Debug)]
pub struct AnalysisSession {
    classifier: FrameClassifier,
    mode: ClassifierMode,
    markers: Option<BoundaryMarkers>,
    tree: CallTree,
    stats: SessionStats,
    window: Option<RecordingWindow>,
}

impl AnalysisSession {
    pub fn new(config: AnalysisConfig) -> Self {
        let formatter = FrameKeyFormatter::new(config.include_line_number);
        let classifier =
            FrameClassifier::new(config.policy, formatter, config.exclude_class_loading);

        Self {
            classifier,
            mode: config.mode,
            markers: None,
            tree: CallTree::new(),
            stats: SessionStats::default(),
            window: None,
        }
    }

    pub fn classifier(&self) -> &FrameClassifier {
        &self.classifier
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn markers(&self) -> Option<&BoundaryMarkers> {
        self.markers.as_ref()
    }

    /// Use an externally collected marker set
    pub fn set_markers(&mut self, markers: BoundaryMarkers) {
        self.stats.boundary_markers = markers.len();
        self.markers = Some(markers);
    }

    /// First pass: collect caller markers when the mode needs them
    pub fn prepare(&mut self, samples: &[StackTrace]) {
        if self.mode == ClassifierMode::Callers {
            let markers = self.classifier.collect_boundary_markers(samples);
            self.set_markers(markers);
        }
    }

    /// Classify one stack and fold it into the tree
    ///
    /// **Public** - second pass, called once per decoded stack; a weighted
    /// stack counts as `weight` samples
    pub fn record(&mut self, sample: &StackTrace) -> Verdict {
        let verdict = match sample.resolve() {
            Some(frames) => {
                let verdict = self
                    .classifier
                    .classify_resolved(&frames, self.markers.as_ref());
                if let Verdict::Analyze { from_index, .. } = verdict {
                    self.tree.insert_weighted(
                        self.classifier.path_keys(&frames, from_index),
                        sample.weight,
                    );
                }
                verdict
            }
            None => Verdict::Skip(SkipReason::Malformed),
        };

        self.stats.record(&verdict, sample.weight);
        verdict
    }

    /// Both passes over a materialized capture
    ///
    /// **Public** - main entry point for a run
    pub fn run(&mut self, samples: &[StackTrace]) {
        debug!(
            "Analyzing {} stacks in {:?} mode",
            samples.len(),
            self.mode
        );

        self.window = RecordingWindow::from_samples(samples);
        self.prepare(samples);

        for sample in samples {
            self.record(sample);
        }

        info!("Classification: {}", self.stats.summary());
    }

    /// Current totals
    pub fn summary(&self) -> Summary {
        Summary::new(self.stats.total_samples, self.tree.attributed_samples())
    }

    /// Verify the tree and freeze the run
    ///
    /// # Errors
    /// * `AnalysisError::InvariantViolation` - A node's children outnumber it
    pub fn finish(self) -> Result<AnalysisReport, AnalysisError> {
        self.tree.verify()?;

        debug!(
            "Call tree: {} nodes, max depth {}",
            self.tree.node_count(),
            self.tree.max_depth()
        );

        let summary = self.summary();
        Ok(AnalysisReport {
            tree: self.tree,
            summary,
            stats: self.stats,
            label: self.classifier.policy().report_label.clone(),
            window: self.window,
        })
    }
}

/// Run a whole capture through a fresh session
pub fn analyze(
    samples: &[StackTrace],
    config: AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let mut session = AnalysisSession::new(config);
    session.run(samples);
    session.finish()
}
