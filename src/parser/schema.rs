//! Decoder-independent sample model.
//!
//! Every input adapter maps its capture format into these types. The
//! analysis core never sees anything format-specific.

use crate::utils::config::UNKNOWN_LINE;
use chrono::{DateTime, FixedOffset};

/// One level of a captured call stack
///
/// `type_name` and `method_name` are optional because captures can contain
/// partially unresolved symbols. A frame missing either is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Fully qualified declaring type, dot separated
    pub type_name: Option<String>,

    /// Declaring package, when the capture records it separately
    pub package_name: Option<String>,

    /// Method name without descriptor
    pub method_name: Option<String>,

    /// Source line, `-1` when unknown
    pub line: i32,
}

impl StackFrame {
    /// Create a fully resolved frame
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>, line: i32) -> Self {
        Self {
            type_name: Some(type_name.into()),
            package_name: None,
            method_name: Some(method_name.into()),
            line,
        }
    }

    /// Create a frame without line information
    pub fn without_line(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self::new(type_name, method_name, UNKNOWN_LINE)
    }

    /// Set the package name explicitly
    pub fn with_package(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    /// Borrow the frame as resolved data, if both type and method are known
    pub fn resolve(&self) -> Option<ResolvedFrame<'_>> {
        let type_name = self.type_name.as_deref().filter(|t| !t.is_empty())?;
        let method_name = self.method_name.as_deref().filter(|m| !m.is_empty())?;
        let package_name = match self.package_name.as_deref() {
            Some(package) => package,
            None => package_of(type_name),
        };

        Some(ResolvedFrame {
            type_name,
            package_name,
            method_name,
            line: self.line,
        })
    }
}

/// A frame whose type and method are known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFrame<'a> {
    pub type_name: &'a str,
    pub package_name: &'a str,
    pub method_name: &'a str,
    pub line: i32,
}

impl ResolvedFrame<'_> {
    /// `<type>.<method>` without line, used for trampoline matching
    pub fn signature(&self) -> String {
        format!("{}.{}", self.type_name, self.method_name)
    }
}

/// One captured stack, innermost frame first
///
/// `weight` is the number of identical samples the stack stands for. Folded
/// inputs carry one entry per distinct stack, so memory follows the number
/// of distinct paths rather than the raw sample count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTrace {
    pub frames: Vec<StackFrame>,

    /// Capture time, when the decoder provides one
    pub timestamp: Option<DateTime<FixedOffset>>,

    /// Samples represented by this entry
    pub weight: u64,
}

impl Default for StackTrace {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl StackTrace {
    /// Build a single sample from frames ordered innermost first
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Self {
            frames,
            timestamp: None,
            weight: 1,
        }
    }

    /// Let this entry stand for `weight` identical samples
    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = weight;
        self
    }

    /// Build a sample from frames ordered outermost first
    pub fn from_outermost(mut frames: Vec<StackFrame>) -> Self {
        frames.reverse();
        Self::new(frames)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Resolve every frame, or `None` if any frame is malformed
    pub fn resolve(&self) -> Option<Vec<ResolvedFrame<'_>>> {
        self.frames.iter().map(StackFrame::resolve).collect()
    }
}

/// Package part of a fully qualified type name
///
/// Nested types (`a.b.Outer$Inner`) belong to the package of the outer type.
pub fn package_of(type_name: &str) -> &str {
    match type_name.rfind('.') {
        Some(pos) => &type_name[..pos],
        None => "",
    }
}

/// Binary class name (`java.lang.Thread`) from either naming form
///
/// Internal names (`java/lang/Thread`) are converted. Names that already
/// contain a `.` are kept as they are, so the `/0x...` suffix of hidden and
/// lambda classes survives in both forms.
pub fn to_binary_name(name: &str) -> String {
    if name.contains('.') {
        return name.to_string();
    }

    match name.rsplit_once('/') {
        Some((class, suffix)) if is_hidden_class_suffix(suffix) => {
            format!("{}/{}", class.replace('/', "."), suffix)
        }
        _ => name.replace('/', "."),
    }
}

fn is_hidden_class_suffix(suffix: &str) -> bool {
    suffix
        .strip_prefix("0x")
        .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
