//! Classifier policy: the frame-shape heuristics as data.
//!
//! The offsets and marker names depend on how a given agent version lays out
//! its frames, so they are loaded from TOML instead of being compiled in.
//! Every field has a default matching the Glowroot agent.

use crate::parser::ResolvedFrame;
use crate::utils::config::{
    DEFAULT_BOUNDARY_OFFSET, DEFAULT_CLASS_LOADING_METHODS, DEFAULT_INSTRUMENTATION_PREFIX,
    DEFAULT_MARKER_INWARD_PREFIXES, DEFAULT_MARKER_OFFSET, DEFAULT_REFLECTION_TRAMPOLINES,
    DEFAULT_REPORT_LABEL, DEFAULT_SELF_EXCLUSION_PREFIX, DEFAULT_SYNTHETIC_MARKERS,
    DEFAULT_THREAD_ENTRY_METHODS,
};
use crate::utils::error::PolicyError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete classifier policy
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierPolicy {
    /// Package prefix of the subsystem under study
    pub instrumentation_prefix: String,

    /// Type prefix never attributed to the subsystem (empty disables)
    pub self_exclusion_prefix: String,

    /// Name printed in the `Total <label>:` report line
    pub report_label: String,

    /// Frames kept outside the boundary frame (negative skips inward)
    pub boundary_offset: isize,

    /// Same as `boundary_offset`, for boundaries found via caller markers
    pub marker_offset: isize,

    /// A marker only counts when the next inward frame's type has one of these prefixes
    pub marker_inward_prefixes: Vec<String>,

    /// Method name tokens of synthetic frames generated by the agent
    pub synthetic_markers: Vec<String>,

    /// `<type>.<method>` signatures of reflection dispatch frames
    pub reflection_trampolines: Vec<String>,

    /// Methods that are never recorded as caller markers
    pub thread_entry_methods: Vec<String>,

    /// Methods whose presence marks a sample as class loading
    pub class_loading_methods: Vec<String>,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            instrumentation_prefix: DEFAULT_INSTRUMENTATION_PREFIX.to_string(),
            self_exclusion_prefix: DEFAULT_SELF_EXCLUSION_PREFIX.to_string(),
            report_label: DEFAULT_REPORT_LABEL.to_string(),
            boundary_offset: DEFAULT_BOUNDARY_OFFSET,
            marker_offset: DEFAULT_MARKER_OFFSET,
            marker_inward_prefixes: to_strings(DEFAULT_MARKER_INWARD_PREFIXES),
            synthetic_markers: to_strings(DEFAULT_SYNTHETIC_MARKERS),
            reflection_trampolines: to_strings(DEFAULT_REFLECTION_TRAMPOLINES),
            thread_entry_methods: to_strings(DEFAULT_THREAD_ENTRY_METHODS),
            class_loading_methods: to_strings(DEFAULT_CLASS_LOADING_METHODS),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl ClassifierPolicy {
    /// Override the subsystem prefix
    pub fn with_instrumentation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.instrumentation_prefix = prefix.into();
        self
    }

    /// Override the self-exclusion prefix
    pub fn with_self_exclusion_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.self_exclusion_prefix = prefix.into();
        self
    }

    pub fn with_boundary_offset(mut self, offset: isize) -> Self {
        self.boundary_offset = offset;
        self
    }

    /// Check values that would make every sample unrelated
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.instrumentation_prefix.trim().is_empty() {
            return Err(PolicyError::Invalid(
                "instrumentation_prefix cannot be empty".to_string(),
            ));
        }
        if !self.self_exclusion_prefix.is_empty()
            && self
                .instrumentation_prefix
                .starts_with(&self.self_exclusion_prefix)
        {
            return Err(PolicyError::Invalid(format!(
                "self_exclusion_prefix '{}' excludes the whole instrumentation prefix '{}'",
                self.self_exclusion_prefix, self.instrumentation_prefix
            )));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, PolicyError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Primary predicate: frame belongs to the subsystem
    pub fn is_instrumentation_frame(&self, frame: &ResolvedFrame<'_>) -> bool {
        frame.package_name.starts_with(&self.instrumentation_prefix)
            && !self.is_self_excluded(frame)
    }

    fn is_self_excluded(&self, frame: &ResolvedFrame<'_>) -> bool {
        !self.self_exclusion_prefix.is_empty()
            && frame.type_name.starts_with(&self.self_exclusion_prefix)
    }

    pub fn is_reflection_trampoline(&self, frame: &ResolvedFrame<'_>) -> bool {
        let signature = frame.signature();
        self.reflection_trampolines.iter().any(|t| *t == signature)
    }

    pub fn is_thread_entry(&self, frame: &ResolvedFrame<'_>) -> bool {
        self.thread_entry_methods
            .iter()
            .any(|m| m == frame.method_name)
    }

    pub fn is_synthetic_marker(&self, frame: &ResolvedFrame<'_>) -> bool {
        self.synthetic_markers
            .iter()
            .any(|token| frame.method_name.contains(token.as_str()))
    }

    pub fn is_class_loading(&self, frame: &ResolvedFrame<'_>) -> bool {
        self.class_loading_methods
            .iter()
            .any(|m| m == frame.method_name)
    }

    pub fn has_marker_inward_prefix(&self, frame: &ResolvedFrame<'_>) -> bool {
        self.marker_inward_prefixes
            .iter()
            .any(|p| frame.type_name.starts_with(p.as_str()))
    }
}

/// Load a policy from a TOML file
///
/// Missing fields fall back to their defaults.
///
/// # Errors
/// * `PolicyError::IoError` - If file cannot be read
/// * `PolicyError::ParseFailed` - If TOML is invalid
/// * `PolicyError::Invalid` - If the policy fails validation
///
/// # Example
/// ```ignore
/// let policy = load_policy("glowroot-0.14.toml")?;
/// ```
pub fn load_policy(path: impl AsRef<Path>) -> Result<ClassifierPolicy, PolicyError> {
    let path = path.as_ref();
    debug!("Loading classifier policy from {}", path.display());

    let contents = fs::read_to_string(path)?;
    let policy: ClassifierPolicy = toml::from_str(&contents)?;
    policy.validate()?;
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::StackFrame;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let policy: ClassifierPolicy = toml::from_str("boundary_offset = 0\n").unwrap();
        assert_eq!(policy.boundary_offset, 0);
        assert_eq!(policy.instrumentation_prefix, "org.glowroot.agent");
        assert_eq!(policy.marker_offset, 2);
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let policy = ClassifierPolicy::default();
        let text = policy.to_toml().unwrap();
        let parsed: ClassifierPolicy = toml::from_str(&text).unwrap();
        assert_eq!(parsed, policy);
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let policy = ClassifierPolicy::default().with_instrumentation_prefix("");
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_covering_self_exclusion() {
        let policy = ClassifierPolicy::default().with_self_exclusion_prefix("org.glowroot");
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_self_exclusion() {
        let policy =
            ClassifierPolicy::default().with_self_exclusion_prefix("org.glowroot.agent.jfr");
        let own = StackFrame::new("org.glowroot.agent.jfr.Analyzer", "main", 1);
        let agent = StackFrame::new("org.glowroot.agent.impl.Transaction", "end", 1);
        assert!(!policy.is_instrumentation_frame(&own.resolve().unwrap()));
        assert!(policy.is_instrumentation_frame(&agent.resolve().unwrap()));
    }

    #[test]
    fn test_trampoline_ignores_line() {
        let policy = ClassifierPolicy::default();
        let frame = StackFrame::new("jdk.internal.reflect.DelegatingMethodAccessorImpl", "invoke", 43);
        assert!(policy.is_reflection_trampoline(&frame.resolve().unwrap()));
    }
}
