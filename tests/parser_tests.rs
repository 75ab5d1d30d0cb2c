use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use trace_lens::parser::{parse_raw_data, parse_trace_file, TraceTag};
use trace_lens::store::CollectionStore;
use trace_lens::utils::error::ParseError;

fn write_export(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();
    file
}

#[test]
fn test_parse_trace_file() {
    let file = write_export(&json!({
        "staticContexts": [null, {"staticContextId": 1, "displayName": "main"}],
        "staticTraces": [null, {"staticTraceId": 1, "staticContextId": 1, "displayName": "x = 1"}],
        "executionContexts": [null, {"contextId": 1, "staticContextId": 1}],
        "traces": [null, {"contextId": 1, "staticTraceId": 1, "createdAt": 1700000000000u64}]
    }));

    let raw = parse_trace_file(file.path()).unwrap();

    assert_eq!(raw.total_rows(), 4);
    assert_eq!(raw.static_contexts[0].display_name, "main");
    assert_eq!(raw.traces[0].trace_id, 1);
    assert_eq!(
        raw.traces[0].created_at_utc().map(|t| t.to_rfc3339()),
        Some("2023-11-14T22:13:20+00:00".to_string())
    );
}

#[test]
fn test_wrapped_collections_and_contexts_alias() {
    let raw = parse_raw_data(&json!({
        "collections": {
            "staticContexts": [null, {"staticContextId": 1, "displayName": "main"}],
            "contexts": [null, {"contextId": 3, "staticContextId": 1, "parentContextId": null}]
        }
    }))
    .unwrap();

    assert_eq!(raw.contexts.len(), 1);
    assert_eq!(raw.contexts[0].context_id, 3);
    assert_eq!(raw.contexts[0].parent_context_id, None);
    assert!(raw.traces.is_empty());
}

#[test]
fn test_float_ids_and_null_call_ids() {
    let raw = parse_raw_data(&json!({
        "staticTraces": [
            null,
            {"staticTraceId": 4.0, "staticContextId": 1, "callId": 7.0, "resultCallId": null},
            {"staticTraceId": 5, "staticContextId": 1, "type": "CallExpression"}
        ]
    }))
    .unwrap();

    assert_eq!(raw.static_traces[0].static_trace_id, 4);
    assert_eq!(raw.static_traces[0].call_id, 7);
    assert_eq!(raw.static_traces[0].result_call_id, 0);
    assert_eq!(raw.static_traces[1].call_id, 0);
    assert_eq!(
        raw.static_traces[1].trace_type,
        Some(TraceTag::Name("CallExpression".to_string()))
    );
}

#[test]
fn test_explicit_trace_ids_kept() {
    let raw = parse_raw_data(&json!({
        "traces": [null,
            {"traceId": 10, "contextId": 1, "staticTraceId": 1},
            {"contextId": 1, "staticTraceId": 1}
        ]
    }))
    .unwrap();

    let ids: Vec<u64> = raw.traces.iter().map(|t| t.trace_id).collect();
    assert_eq!(ids, vec![10, 2]);
}

#[test]
fn test_implicit_ids_do_not_collide_with_explicit_ids() {
    let raw = parse_raw_data(&json!({
        "traces": [null,
            {"traceId": 2, "contextId": 1, "staticTraceId": 1},
            {"contextId": 1, "staticTraceId": 1}
        ]
    }))
    .unwrap();

    let ids: Vec<u64> = raw.traces.iter().map(|t| t.trace_id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(CollectionStore::new(raw).is_ok());
}

#[test]
fn test_implicit_ids_survive_skipped_rows() {
    let raw = parse_raw_data(&json!({
        "traces": [null,
            {"contextId": "broken"},
            {"contextId": 1, "staticTraceId": 1},
            {"contextId": 1, "staticTraceId": 2}
        ]
    }))
    .unwrap();

    let ids: Vec<u64> = raw.traces.iter().map(|t| t.trace_id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn test_not_an_object() {
    let result = parse_raw_data(&json!([1, 2, 3]));
    assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
}

#[test]
fn test_no_known_collections() {
    let result = parse_raw_data(&json!({"values": []}));
    assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
}

#[test]
fn test_collection_not_an_array() {
    let result = parse_raw_data(&json!({"traces": {"contextId": 1}}));
    assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
}

#[test]
fn test_invalid_json_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let result = parse_trace_file(file.path());
    assert!(matches!(result, Err(ParseError::JsonError(_))));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = parse_trace_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(ParseError::Io(_))));
}
