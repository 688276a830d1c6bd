//! Canonical frame identity used as the call tree edge key.
//!
//! Format: `<type>.<method>()` with an optional ` line: <n>` suffix.
//! Example: `org.glowroot.agent.impl.Transaction.end() line: 42`
//!
//! No normalization happens here. Two frames merge into the same tree node
//! exactly when their keys are byte-equal.

use crate::parser::ResolvedFrame;
use std::borrow::Borrow;
use std::fmt;

/// Canonical string identity of one stack frame
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameKey(String);

impl FrameKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the synthetic root
    pub fn root() -> Self {
        Self(String::new())
    }
}

impl fmt::Display for FrameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FrameKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for FrameKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for FrameKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Formats frames into keys; the line switch is fixed for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameKeyFormatter {
    include_line_number: bool,
}

impl FrameKeyFormatter {
    pub fn new(include_line_number: bool) -> Self {
        Self {
            include_line_number,
        }
    }

    pub fn includes_line_number(&self) -> bool {
        self.include_line_number
    }

    /// Format one resolved frame
    pub fn format(&self, frame: &ResolvedFrame<'_>) -> FrameKey {
        let mut key = String::with_capacity(frame.type_name.len() + frame.method_name.len() + 16);
        key.push_str(frame.type_name);
        key.push('.');
        key.push_str(frame.method_name);
        key.push_str("()");
        if self.include_line_number {
            key.push_str(" line: ");
            key.push_str(&frame.line.to_string());
        }
        FrameKey(key)
    }
}

impl Default for FrameKeyFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}
