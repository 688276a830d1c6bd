//! Adapter for the JSON emitted by `jfr print --json`.
//!
//! Only sample events are kept. Frames are mapped one-to-one into
//! [`StackFrame`]; JFR already orders them innermost first.

use super::schema::{to_binary_name, StackFrame, StackTrace};
use crate::utils::config::{EXECUTION_SAMPLE_EVENT, NATIVE_SAMPLE_EVENT, UNKNOWN_LINE};
use crate::utils::error::ParseError;
use chrono::DateTime;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

/// Event list under `recording`, or at the top level of a trimmed file
#[derive(Debug, Deserialize)]
struct JfrEvents {
    events: Vec<JfrEvent>,
}

#[derive(Debug, Deserialize)]
struct JfrEvent {
    #[serde(rename = "type")]
    event_type: String,

    #[serde(default)]
    values: JfrValues,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JfrValues {
    #[serde(default)]
    start_time: Option<String>,

    #[serde(default)]
    stack_trace: Option<JfrStackTrace>,
}

#[derive(Debug, Deserialize)]
struct JfrStackTrace {
    #[serde(default)]
    truncated: bool,

    #[serde(default)]
    frames: Vec<JfrFrame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JfrFrame {
    #[serde(default)]
    method: Option<JfrMethod>,

    #[serde(default)]
    line_number: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct JfrMethod {
    #[serde(default, rename = "type")]
    declaring_type: Option<JfrClass>,

    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JfrClass {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    package: Option<JfrPackage>,
}

#[derive(Debug, Deserialize)]
struct JfrPackage {
    #[serde(default)]
    name: Option<String>,
}

/// Parse `jfr print --json` output into samples
///
/// **Public** - adapter entry point
///
/// # Arguments
/// * `raw` - JSON text
/// * `include_native` - Also keep `jdk.NativeMethodSample` events
///
/// # Errors
/// * `ParseError::JsonError` - Input is not JSON, or an event does not decode
/// * `ParseError::InvalidFormat` - Input is JSON but holds no event list
pub fn parse_jfr_json(raw: &str, include_native: bool) -> Result<Vec<StackTrace>, ParseError> {
    let events = extract_events(serde_json::from_str(raw)?)?;

    debug!("JFR document contains {} events", events.len());

    let mut truncated = 0usize;
    let samples: Vec<StackTrace> = events
        .into_iter()
        .filter(|event| is_sample_event(&event.event_type, include_native))
        .map(|event| {
            let (sample, was_truncated) = to_stack_trace(event.values);
            if was_truncated {
                truncated += 1;
            }
            sample
        })
        .collect();

    if truncated > 0 {
        warn!(
            "{} of {} stack traces were truncated by the recorder; outermost frames are missing",
            truncated,
            samples.len()
        );
    }

    debug!("Decoded {} sample events", samples.len());
    Ok(samples)
}

/// Locate the event list
///
/// `jfr print --json` wraps events in `recording`, but hand-trimmed files
/// often keep only the `events` object or the bare array. Whichever shape
/// is found is decoded strictly.
fn extract_events(document: Value) -> Result<Vec<JfrEvent>, ParseError> {
    match document {
        Value::Array(_) => Ok(serde_json::from_value(document)?),
        Value::Object(mut fields) => {
            if let Some(recording) = fields.remove("recording") {
                let recording: JfrEvents = serde_json::from_value(recording)?;
                Ok(recording.events)
            } else if let Some(events) = fields.remove("events") {
                Ok(serde_json::from_value(events)?)
            } else {
                Err(ParseError::InvalidFormat(
                    "JSON object has neither `recording` nor `events`".to_string(),
                ))
            }
        }
        other => Err(ParseError::InvalidFormat(format!(
            "expected a JFR JSON object or event array, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn is_sample_event(event_type: &str, include_native: bool) -> bool {
    event_type == EXECUTION_SAMPLE_EVENT || (include_native && event_type == NATIVE_SAMPLE_EVENT)
}

/// Map one event into a sample, reporting whether the recorder truncated it
fn to_stack_trace(values: JfrValues) -> (StackTrace, bool) {
    let timestamp = values
        .start_time
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok());

    let Some(stack_trace) = values.stack_trace else {
        return (
            StackTrace {
                timestamp,
                ..StackTrace::default()
            },
            false,
        );
    };

    let frames = stack_trace.frames.into_iter().map(to_stack_frame).collect();
    let sample = StackTrace {
        timestamp,
        ..StackTrace::new(frames)
    };
    (sample, stack_trace.truncated)
}

fn to_stack_frame(frame: JfrFrame) -> StackFrame {
    let (type_name, package_name, method_name) = match frame.method {
        Some(method) => {
            let (type_name, package_name) = match method.declaring_type {
                Some(class) => (
                    class.name.map(|n| to_binary_name(&n)),
                    class.package.and_then(|p| p.name).map(|n| to_binary_name(&n)),
                ),
                None => (None, None),
            };
            (type_name, package_name, method.name)
        }
        None => (None, None, None),
    };

    StackFrame {
        type_name,
        package_name,
        method_name,
        line: frame.line_number.unwrap_or(UNKNOWN_LINE),
    }
}
