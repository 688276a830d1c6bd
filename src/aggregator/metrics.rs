//! Run-level counters and the attribution summary.
//!
//! The percentage of samples attributed to the subsystem is the headline
//! number of a report. It is undefined for an empty capture, which is
//! reported explicitly instead of dividing by zero.

use super::classifier::{SkipReason, Verdict};
use crate::parser::StackTrace;
use chrono::{DateTime, FixedOffset};
use log::debug;

/// Totals handed to the report writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Every sample read, whatever its verdict
    pub total_samples: u64,

    /// Samples recorded in the call tree
    pub attributed_samples: u64,
}

impl Summary {
    pub fn new(total_samples: u64, attributed_samples: u64) -> Self {
        Self {
            total_samples,
            attributed_samples,
        }
    }

    /// Attributed share in percent, `None` when there are no samples
    pub fn percentage(&self) -> Option<f64> {
        if self.total_samples == 0 {
            return None;
        }
        Some(self.attributed_samples as f64 / self.total_samples as f64 * 100.0)
    }

    /// `true` when the capture had no samples at all
    pub fn is_empty(&self) -> bool {
        self.total_samples == 0
    }
}

/// Verdict tallies for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub total_samples: u64,
    pub attributed: u64,
    pub unrelated: u64,
    pub malformed: u64,
    pub class_loading: u64,
    pub boundary_markers: usize,
}

impl SessionStats {
    /// Count `weight` samples under their shared verdict
    pub fn record(&mut self, verdict: &Verdict, weight: u64) {
        self.total_samples += weight;
        let bucket = match verdict {
            Verdict::Analyze { .. } => &mut self.attributed,
            Verdict::Skip(SkipReason::Unrelated) => &mut self.unrelated,
            Verdict::Skip(SkipReason::Malformed) => &mut self.malformed,
            Verdict::Skip(SkipReason::ClassLoading) => &mut self.class_loading,
        };
        *bucket += weight;
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Samples: {} | Attributed: {} | Unrelated: {} | Malformed: {} | Class loading: {} | Markers: {}",
            self.total_samples,
            self.attributed,
            self.unrelated,
            self.malformed,
            self.class_loading,
            self.boundary_markers
        )
    }
}

/// Time span covered by timestamped samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl RecordingWindow {
    /// Span of the samples that carry a timestamp, if any do
    pub fn from_samples(samples: &[StackTrace]) -> Option<Self> {
        let mut timestamps = samples.iter().filter_map(|s| s.timestamp);
        let first = timestamps.next()?;
        let (start, end) = timestamps.fold((first, first), |(start, end), t| {
            (start.min(t), end.max(t))
        });

        debug!("Recording window: {} .. {}", start, end);
        Some(Self { start, end })
    }

    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }
}
