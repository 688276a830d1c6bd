//! Configuration and constants for the CLI.

/// JFR event type carrying Java CPU samples
pub const EXECUTION_SAMPLE_EVENT: &str = "jdk.ExecutionSample";

/// JFR event type carrying samples of threads parked in native code
pub const NATIVE_SAMPLE_EVENT: &str = "jdk.NativeMethodSample";

/// Line number used when the capture has none for a frame
pub const UNKNOWN_LINE: i32 = -1;

// Defaults for the classifier policy (Glowroot agent)
pub const DEFAULT_INSTRUMENTATION_PREFIX: &str = "org.glowroot.agent";
pub const DEFAULT_SELF_EXCLUSION_PREFIX: &str = "org.glowroot.benchmark";
pub const DEFAULT_REPORT_LABEL: &str = "Glowroot";

// Number of frames outside the boundary frame kept in the path
pub const DEFAULT_BOUNDARY_OFFSET: isize = 1;
pub const DEFAULT_MARKER_OFFSET: isize = 2;

pub const DEFAULT_MARKER_INWARD_PREFIXES: &[&str] = &["java.", "org.glowroot"];
pub const DEFAULT_SYNTHETIC_MARKERS: &[&str] = &["glowroot$"];
pub const DEFAULT_REFLECTION_TRAMPOLINES: &[&str] = &[
    "jdk.internal.reflect.DelegatingMethodAccessorImpl.invoke",
    "sun.reflect.DelegatingMethodAccessorImpl.invoke",
];
pub const DEFAULT_THREAD_ENTRY_METHODS: &[&str] = &["run"];
pub const DEFAULT_CLASS_LOADING_METHODS: &[&str] = &["loadClass"];

// File extensions recognized when auto-detecting the input format
pub const JSON_EXTENSIONS: &[&str] = &["json"];
pub const COLLAPSED_EXTENSIONS: &[&str] = &["folded", "collapsed", "txt"];
