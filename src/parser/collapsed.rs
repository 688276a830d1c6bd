//! Adapter for folded ("collapsed") stack files.
//!
//! Each line has the format `frame;frame;... count`, outermost frame first,
//! as produced by async-profiler's `collapsed` output and the FlameGraph
//! `stackcollapse-*` scripts. A frame is `<type>.<method>`, optionally
//! followed by `:<line>`.

use super::schema::{to_binary_name, StackFrame, StackTrace};
use crate::utils::config::UNKNOWN_LINE;
use crate::utils::error::ParseError;
use log::debug;

/// Parse folded stacks into weighted samples
///
/// **Public** - adapter entry point
///
/// Each line becomes one [`StackTrace`] whose `weight` is the line's count,
/// so the analysis sees the sample count the profiler recorded without
/// materializing every sample. Lines with a zero count are dropped.
///
/// # Errors
/// * `ParseError::InvalidFormat` - A line has no count
/// * `ParseError::InvalidCount` - The count is not a non-negative integer
pub fn parse_collapsed(raw: &str) -> Result<Vec<StackTrace>, ParseError> {
    let mut samples = Vec::new();
    let mut total = 0u64;

    for (index, line) in raw.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (stack, count) = split_count(line, line_number)?;
        if count == 0 {
            continue;
        }

        let frames: Vec<StackFrame> = stack
            .split(';')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(parse_frame)
            .collect();

        total = total.saturating_add(count);
        samples.push(StackTrace::from_outermost(frames).with_weight(count));
    }

    debug!(
        "Read {} folded stacks carrying {} samples",
        samples.len(),
        total
    );
    Ok(samples)
}

/// Split `"a;b;c 42"` into the stack and its count
fn split_count(line: &str, line_number: usize) -> Result<(&str, u64), ParseError> {
    let pos = line.rfind(char::is_whitespace).ok_or_else(|| {
        ParseError::InvalidFormat(format!("line {} has no sample count", line_number))
    })?;

    let value = line[pos..].trim();
    let count = value.parse::<u64>().map_err(|_| ParseError::InvalidCount {
        line: line_number,
        value: value.to_string(),
    })?;

    Ok((line[..pos].trim_end(), count))
}

/// Parse one folded frame
///
/// Accepts `a.b.C.m`, `a.b.C.m()`, `a/b/C.m_[j]` and any of those with a
/// `:<line>` suffix. A frame without a type part is kept as malformed.
pub fn parse_frame(raw: &str) -> StackFrame {
    let raw = strip_annotation(raw);
    let (name, line) = match raw.rsplit_once(':') {
        Some((name, line)) => match line.parse::<i32>() {
            Ok(line) => (name, line),
            Err(_) => (raw, UNKNOWN_LINE),
        },
        None => (raw, UNKNOWN_LINE),
    };

    let name = name.strip_suffix("()").unwrap_or(name);

    if let Some((type_name, method_name)) = name.rsplit_once('.') {
        if !type_name.is_empty() {
            return StackFrame::new(to_binary_name(type_name), method_name, line);
        }
    }

    StackFrame {
        type_name: None,
        package_name: None,
        method_name: Some(name.to_string()),
        line,
    }
}

/// Drop async-profiler frame type suffixes (`_[j]`, `_[i]`, `_[k]`, ...)
fn strip_annotation(raw: &str) -> &str {
    match raw.rfind("_[") {
        Some(pos) if raw.ends_with(']') => &raw[..pos],
        _ => raw,
    }
}
