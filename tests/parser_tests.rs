use agentprof::parser::{decode_samples, parse_collapsed, parse_jfr_json, InputFormat};
use agentprof::utils::ParseError;
use serde_json::json;

fn jfr_frame(type_name: &str, method: &str, line: i32) -> serde_json::Value {
    json!({
        "method": {
            "type": { "name": type_name },
            "name": method,
            "descriptor": "()V"
        },
        "lineNumber": line,
        "bytecodeIndex": 0,
        "type": "JIT compiled"
    })
}

#[test]
fn test_jfr_json_keeps_execution_samples_only() {
    let document = json!({
        "recording": {
            "events": [
                {
                    "type": "jdk.ExecutionSample",
                    "values": {
                        "startTime": "2024-05-01T08:00:00Z",
                        "state": "STATE_RUNNABLE",
                        "stackTrace": {
                            "truncated": false,
                            "frames": [
                                jfr_frame("org.glowroot.agent.impl.TraceCollector", "collect", 77),
                                jfr_frame("java.lang.Thread", "run", 829)
                            ]
                        }
                    }
                },
                { "type": "jdk.CPULoad", "values": { "jvmUser": 0.1 } },
                {
                    "type": "jdk.ExecutionSample",
                    "values": { "startTime": "2024-05-01T08:00:01Z" }
                }
            ]
        }
    });

    let samples = parse_jfr_json(&document.to_string(), false).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].len(), 2);
    assert_eq!(
        samples[0].frames[0].type_name.as_deref(),
        Some("org.glowroot.agent.impl.TraceCollector")
    );
    assert_eq!(samples[0].frames[1].line, 829);

    // missing stack trace decodes as an empty sample, still counted
    assert!(samples[1].is_empty());
}

#[test]
fn test_jfr_json_truncated_stack_still_decodes() {
    let document = json!({
        "recording": { "events": [ {
            "type": "jdk.ExecutionSample",
            "values": { "stackTrace": { "truncated": true, "frames": [ jfr_frame("a.B", "c", 1) ] } }
        } ] }
    });

    let samples = parse_jfr_json(&document.to_string(), false).unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].len(), 1);
}

#[test]
fn test_jfr_json_wrong_shape() {
    assert!(parse_jfr_json("42", false).is_err());
    assert!(matches!(
        parse_jfr_json(r#"{"foo": 1}"#, false),
        Err(ParseError::InvalidFormat(_))
    ));
}

#[test]
fn test_jfr_json_bad_event_fails_whole_document() {
    let document = json!({
        "recording": { "events": [
            {
                "type": "jdk.ExecutionSample",
                "values": { "stackTrace": { "frames": [ jfr_frame("a.B", "c", 1) ] } }
            },
            { "values": {} }
        ] }
    });

    let result = parse_jfr_json(&document.to_string(), false);
    assert!(matches!(result, Err(ParseError::JsonError(_))));
}

#[test]
fn test_collapsed_matches_jfr_shape() {
    let samples = parse_collapsed(
        "java.lang.Thread.run:829;org.glowroot.agent.impl.TraceCollector.collect:77 2\n",
    )
    .unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].weight, 2);

    let frame = &samples[0].frames[0];
    assert_eq!(
        frame.type_name.as_deref(),
        Some("org.glowroot.agent.impl.TraceCollector")
    );
    assert_eq!(frame.method_name.as_deref(), Some("collect"));
    assert_eq!(frame.line, 77);
}

#[test]
fn test_collapsed_zero_count_line() {
    let samples = parse_collapsed("a.B.c 0\na.B.d 1\n").unwrap();
    assert_eq!(samples.len(), 1);
}

#[test]
fn test_decode_dispatch() {
    let samples = decode_samples(InputFormat::Collapsed, "a.B.c 3", false).unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].weight, 3);

    let samples = decode_samples(InputFormat::JfrJson, r#"{"events": []}"#, false).unwrap();
    assert!(samples.is_empty());
}
