//! Decide which samples belong to the subsystem and where attribution starts.
//!
//! Frames are scanned from the outermost caller inward. The first frame that
//! satisfies a boundary rule fixes `from_index`, the innermost-first index of
//! the outermost frame kept in the call tree. Everything further out is
//! caller context and is dropped.
//!
//! Rules, checked per frame in this order:
//! 1. caller marker - the frame's key was seen directly outside the subsystem
//!    in some sample (two-pass mode only)
//! 2. package - the frame's package starts with the instrumentation prefix
//! 3. synthetic marker - the innermost frame's method name carries an agent
//!    marker token

use super::frame_key::{FrameKey, FrameKeyFormatter};
use super::policy::ClassifierPolicy;
use crate::parser::{ResolvedFrame, StackTrace};
use clap::ValueEnum;
use log::debug;
use std::collections::HashSet;
use std::fmt;

/// How many passes the classifier makes over the samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ClassifierMode {
    /// One pass, package and synthetic marker rules only
    Simple,
    /// Collect caller markers first, then classify
    #[default]
    Callers,
}

/// Rule that located the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRule {
    CallerMarker,
    Package,
    SyntheticMarker,
}

/// Why a sample is left out of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No boundary rule fired
    Unrelated,
    /// A frame is missing its type or method
    Malformed,
    /// The kept path runs through class loading
    ClassLoading,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unrelated => write!(f, "unrelated"),
            SkipReason::Malformed => write!(f, "malformed"),
            SkipReason::ClassLoading => write!(f, "class_loading"),
        }
    }
}

/// Classification result for one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Skip(SkipReason),
    Analyze { from_index: usize, rule: BoundaryRule },
}

/// Keys of frames observed directly outside the subsystem
#[derive(Debug, Clone, Default)]
pub struct BoundaryMarkers {
    keys: HashSet<FrameKey>,
}

impl BoundaryMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FrameKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &FrameKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in lexical order
    pub fn sorted(&self) -> Vec<&FrameKey> {
        let mut keys: Vec<&FrameKey> = self.keys.iter().collect();
        keys.sort();
        keys
    }
}

impl FromIterator<FrameKey> for BoundaryMarkers {
    fn from_iter<I: IntoIterator<Item = FrameKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Stateless classifier for one run
#[derive(Debug, Clone)]
pub struct FrameClassifier {
    policy: ClassifierPolicy,
    formatter: FrameKeyFormatter,
    exclude_class_loading: bool,
}

impl FrameClassifier {
    pub fn new(
        policy: ClassifierPolicy,
        formatter: FrameKeyFormatter,
        exclude_class_loading: bool,
    ) -> Self {
        Self {
            policy,
            formatter,
            exclude_class_loading,
        }
    }

    pub fn policy(&self) -> &ClassifierPolicy {
        &self.policy
    }

    pub fn formatter(&self) -> &FrameKeyFormatter {
        &self.formatter
    }

    /// Classify one sample
    ///
    /// **Public** - main entry point for classification
    pub fn classify(&self, trace: &StackTrace, markers: Option<&BoundaryMarkers>) -> Verdict {
        match trace.resolve() {
            Some(frames) => self.classify_resolved(&frames, markers),
            None => Verdict::Skip(SkipReason::Malformed),
        }
    }

    /// Classify a sample whose frames are already resolved
    pub fn classify_resolved(
        &self,
        frames: &[ResolvedFrame<'_>],
        markers: Option<&BoundaryMarkers>,
    ) -> Verdict {
        let Some((from_index, rule)) = self.find_boundary(frames, markers) else {
            return Verdict::Skip(SkipReason::Unrelated);
        };

        if self.exclude_class_loading && self.touches_class_loading(frames, from_index) {
            return Verdict::Skip(SkipReason::ClassLoading);
        }

        Verdict::Analyze { from_index, rule }
    }

    fn find_boundary(
        &self,
        frames: &[ResolvedFrame<'_>],
        markers: Option<&BoundaryMarkers>,
    ) -> Option<(usize, BoundaryRule)> {
        let markers = markers.filter(|m| !m.is_empty());
        let len = frames.len();

        for i in (0..len).rev() {
            let frame = &frames[i];

            if let Some(markers) = markers {
                if markers.contains(&self.formatter.format(frame)) {
                    if i == 0 {
                        return Some((0, BoundaryRule::CallerMarker));
                    }
                    let inward = &frames[i - 1];
                    // reflection plumbing between caller and agent says nothing, keep scanning
                    if !self.policy.is_reflection_trampoline(inward)
                        && self.policy.has_marker_inward_prefix(inward)
                    {
                        return Some((
                            clamp_index(i, self.policy.marker_offset, len),
                            BoundaryRule::CallerMarker,
                        ));
                    }
                }
            }

            if self.policy.is_instrumentation_frame(frame) {
                return Some((
                    clamp_index(i, self.policy.boundary_offset, len),
                    BoundaryRule::Package,
                ));
            }

            if i == 0 && self.policy.is_synthetic_marker(frame) {
                return Some((
                    clamp_index(0, self.policy.boundary_offset, len),
                    BoundaryRule::SyntheticMarker,
                ));
            }
        }

        None
    }

    fn touches_class_loading(&self, frames: &[ResolvedFrame<'_>], from_index: usize) -> bool {
        frames[..=from_index]
            .iter()
            .any(|f| self.policy.is_class_loading(f))
    }

    /// Key of the frame directly outside the outermost subsystem frame
    ///
    /// Thread entry frames (`run`) are skipped as boundaries, and reflection
    /// trampolines are never recorded; the scan moves inward instead.
    pub fn boundary_caller(&self, trace: &StackTrace) -> Option<FrameKey> {
        let frames = trace.resolve()?;

        for i in (0..frames.len()).rev() {
            let frame = &frames[i];
            if !self.policy.is_instrumentation_frame(frame) || self.policy.is_thread_entry(frame) {
                continue;
            }
            let Some(caller) = frames.get(i + 1) else {
                continue;
            };
            if self.policy.is_reflection_trampoline(caller) {
                continue;
            }
            return Some(self.formatter.format(caller));
        }

        None
    }

    /// First pass of the two-pass mode
    ///
    /// **Public** - must complete before any sample is classified
    pub fn collect_boundary_markers(&self, samples: &[StackTrace]) -> BoundaryMarkers {
        let markers: BoundaryMarkers = samples
            .iter()
            .filter_map(|sample| self.boundary_caller(sample))
            .collect();

        debug!(
            "Collected {} boundary markers from {} samples",
            markers.len(),
            samples.len()
        );
        markers
    }

    /// Keys of the kept path, outermost first
    pub fn path_keys(&self, frames: &[ResolvedFrame<'_>], from_index: usize) -> Vec<FrameKey> {
        frames[..=from_index]
            .iter()
            .rev()
            .map(|f| self.formatter.format(f))
            .collect()
    }
}

/// `index + offset`, bounded to a valid frame index
fn clamp_index(index: usize, offset: isize, len: usize) -> usize {
    let last = len.saturating_sub(1);
    let target = (index as isize).saturating_add(offset);
    if target <= 0 {
        0
    } else {
        (target as usize).min(last)
    }
}
