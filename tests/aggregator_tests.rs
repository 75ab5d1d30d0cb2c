use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use trace_lens::aggregator::metrics::{calculate_hot_contexts, calculate_trace_distribution};
use trace_lens::aggregator::{
    build_context_stacks, CallGraphBuilder, CollapsedStack, ContextResolver, TraceGrouper,
};
use trace_lens::parser::{parse_raw_data, RawCollections, StaticContext, StaticTrace};
use trace_lens::store::{CollectionName, CollectionStore, ColumnValue};
use trace_lens::utils::config::IntegrityConfig;
use trace_lens::utils::error::QueryError;

/// main -> foo -> bar, with foo entered twice
fn sample_export() -> Value {
    json!({
        "staticContexts": [null,
            {"staticContextId": 1, "displayName": "main", "type": 1},
            {"staticContextId": 2, "displayName": "foo", "type": 2},
            {"staticContextId": 3, "displayName": "bar", "type": 2}
        ],
        "staticTraces": [null,
            {"staticTraceId": 1, "staticContextId": 1, "displayName": "foo()", "callId": 1},
            {"staticTraceId": 2, "staticContextId": 1, "displayName": "foo() returned", "resultCallId": 1},
            {"staticTraceId": 3, "staticContextId": 2, "displayName": "bar", "callId": 2},
            {"staticTraceId": 4, "staticContextId": 2, "displayName": "bar(x)", "callId": 2},
            {"staticTraceId": 5, "staticContextId": 2, "displayName": "bar(x) returned", "resultCallId": 2},
            {"staticTraceId": 6, "staticContextId": 3, "displayName": "return x * 2", "type": 7}
        ],
        "executionContexts": [null,
            {"contextId": 1, "staticContextId": 1},
            {"contextId": 2, "staticContextId": 2, "parentContextId": 1},
            {"contextId": 3, "staticContextId": 3, "parentContextId": 2},
            {"contextId": 4, "staticContextId": 2, "parentContextId": 1}
        ],
        "traces": [null,
            {"contextId": 1, "staticTraceId": 1, "createdAt": 1000},
            {"contextId": 2, "staticTraceId": 3, "createdAt": 1001},
            {"contextId": 2, "staticTraceId": 4, "createdAt": 1002},
            {"contextId": 3, "staticTraceId": 6, "createdAt": 1003, "type": 9},
            {"contextId": 2, "staticTraceId": 5, "createdAt": 1004},
            {"contextId": 1, "staticTraceId": 2, "createdAt": 1005},
            {"contextId": 4, "staticTraceId": 3, "createdAt": 1006}
        ]
    })
}

fn sample_store() -> CollectionStore {
    CollectionStore::new(parse_raw_data(&sample_export()).unwrap()).unwrap()
}

fn static_trace(id: u64, call_id: u64, result_call_id: u64, name: &str) -> StaticTrace {
    StaticTrace {
        static_trace_id: id,
        static_context_id: 1,
        call_id,
        result_call_id,
        display_name: name.to_string(),
        trace_type: None,
        loc: None,
    }
}

fn static_trace_store(rows: Vec<StaticTrace>) -> CollectionStore {
    CollectionStore::new(RawCollections {
        static_contexts: vec![StaticContext {
            static_context_id: 1,
            display_name: "main".to_string(),
            loc: None,
            parent_id: None,
            program_id: None,
            context_type: None,
        }],
        static_traces: rows,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_caller_callee_scenario() {
    let store = static_trace_store(vec![
        static_trace(1, 5, 0, "caller"),
        static_trace(2, 0, 5, "callee"),
    ]);
    let builder = CallGraphBuilder::new(&store);

    assert_eq!(builder.unique_static_call_ids().unwrap(), vec![5]);

    let trees: Vec<_> = builder.static_call_trees().unwrap().collect();
    assert_eq!(trees.len(), 1);
    let tree = trees[0].as_ref().unwrap();
    assert_eq!(tree.call_id, 5);
    assert_eq!(tree.caller_names, vec!["caller"]);
    assert_eq!(tree.result.static_trace_id, 2);
}

#[test]
fn test_call_ids_above_i64_max() {
    let big = 1u64 << 63;
    let raw = parse_raw_data(&json!({
        "staticContexts": [null, {"staticContextId": 1, "displayName": "main"}],
        "staticTraces": [null,
            {"staticTraceId": 1, "staticContextId": 1, "displayName": "far()", "callId": big},
            {"staticTraceId": 2, "staticContextId": 1, "displayName": "far() returned", "resultCallId": big}
        ]
    }))
    .unwrap();
    let store = CollectionStore::new(raw).unwrap();
    let builder = CallGraphBuilder::new(&store);

    assert_eq!(builder.unique_static_call_ids().unwrap(), vec![big]);

    let trees: Vec<_> = builder.static_call_trees().unwrap().collect();
    assert_eq!(trees.len(), 1);
    let tree = trees[0].as_ref().unwrap();
    assert_eq!(tree.call_id, big);
    assert_eq!(tree.caller_names, vec!["far()"]);
    assert_eq!(tree.result.static_trace_id, 2);
}

#[test]
fn test_unique_call_ids_sorted_distinct_nonzero() {
    let store = sample_store();
    let ids = CallGraphBuilder::new(&store).unique_static_call_ids().unwrap();

    assert_eq!(ids, vec![1, 2]);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert!(!ids.contains(&0));
}

#[test]
fn test_unique_call_ids_equal_column_union() {
    let store = sample_store();
    let mut expected: Vec<u64> = store
        .static_traces()
        .iter()
        .flat_map(|row| [row.call_id, row.result_call_id])
        .filter(|id| *id != 0)
        .collect();
    expected.sort_unstable();
    expected.dedup();

    assert_eq!(
        CallGraphBuilder::new(&store).unique_static_call_ids().unwrap(),
        expected
    );
}

#[test]
fn test_missing_sentinel() {
    let store = static_trace_store(vec![static_trace(1, 5, 6, "a"), static_trace(2, 6, 5, "b")]);
    assert_eq!(
        CallGraphBuilder::new(&store).unique_static_call_ids(),
        Err(QueryError::MissingSentinel)
    );
    assert!(CallGraphBuilder::new(&store).static_call_trees().is_err());
}

#[test]
fn test_caller_count_matches_call_id_rows() {
    let store = sample_store();
    let trees = CallGraphBuilder::new(&store)
        .static_call_trees()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    for tree in &trees {
        let expected = store
            .static_traces()
            .iter()
            .filter(|row| row.call_id == tree.call_id)
            .count();
        assert_eq!(tree.caller_names.len(), expected);
    }
    assert_eq!(trees[1].caller_names, vec!["bar", "bar(x)"]);
    assert_eq!(trees[1].result.display_name, "bar(x) returned");
}

#[test]
fn test_missing_call_result_is_per_item() {
    let store = static_trace_store(vec![
        static_trace(1, 3, 0, "a()"),
        static_trace(2, 4, 0, "b()"),
        static_trace(3, 0, 4, "b() returned"),
    ]);
    let trees: Vec<_> = CallGraphBuilder::new(&store)
        .static_call_trees()
        .unwrap()
        .collect();

    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0], Err(QueryError::MissingCallResult { call_id: 3 }));
    assert!(trees[1].is_ok());
}

#[test]
fn test_ambiguous_result_strict_and_relaxed() {
    let store = static_trace_store(vec![
        static_trace(1, 7, 0, "f()"),
        static_trace(2, 0, 7, "first"),
        static_trace(3, 0, 7, "second"),
    ]);

    let strict = CallGraphBuilder::new(&store);
    assert_eq!(
        strict.static_call_tree(7),
        Err(QueryError::AmbiguousCallResult {
            call_id: 7,
            count: 2
        })
    );

    let relaxed = CallGraphBuilder::new(&store).with_config(IntegrityConfig {
        allow_ambiguous_results: true,
    });
    assert_eq!(relaxed.static_call_tree(7).unwrap().result.display_name, "first");
}

#[test]
fn test_call_trees_restart() {
    let store = sample_store();
    let builder = CallGraphBuilder::new(&store);
    let first: Vec<_> = builder.static_call_trees().unwrap().collect();
    let second: Vec<_> = builder.static_call_trees().unwrap().collect();
    assert_eq!(first, second);
}

#[test]
fn test_context_display_name_scenario() {
    let store = CollectionStore::new(
        parse_raw_data(&json!({
            "staticContexts": [null, {"staticContextId": 2, "displayName": "foo"}],
            "executionContexts": [null, {"contextId": 10, "staticContextId": 2}]
        }))
        .unwrap(),
    )
    .unwrap();
    let resolver = ContextResolver::new(&store);

    assert_eq!(resolver.context_display_name(10).unwrap(), "foo");
    assert_eq!(resolver.context_display_name(10), resolver.context_display_name(10));
    assert_eq!(
        resolver.context_display_name(99),
        Err(QueryError::ContextNotFound { context_id: 99 })
    );
}

#[test]
fn test_context_hierarchy() {
    let store = sample_store();
    let resolver = ContextResolver::new(&store);

    assert_eq!(resolver.root_context_id(3).unwrap(), 1);
    assert_eq!(resolver.context_path(3).unwrap(), vec!["main", "foo", "bar"]);
    assert_eq!(resolver.static_context_of(4).unwrap().static_context_id, 2);
}

#[test]
fn test_group_traces_by_context() {
    let store = sample_store();
    let groups = TraceGrouper::new(&store).group_traces_by_context().unwrap();

    let summary: Vec<(u64, &str, Vec<u64>)> = groups
        .iter()
        .map(|g| {
            (
                g.context_id,
                g.context_name,
                g.rows.iter().map(|r| r.trace.trace_id).collect(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            (1, "main", vec![1, 6]),
            (2, "foo", vec![2, 3, 5]),
            (3, "bar", vec![4]),
            (4, "foo", vec![7]),
        ]
    );

    let bar = &groups[2].rows[0];
    assert_eq!(bar.static_display_name, "return x * 2");
    assert_eq!(bar.effective_type().map(|t| t.to_string()), Some("9".to_string()));
}

#[test]
fn test_group_static_traces_by_static_context() {
    let store = sample_store();
    let groups = TraceGrouper::new(&store).group_static_traces_by_static_context();

    let summary: Vec<(u64, Vec<u64>)> = groups
        .iter()
        .map(|g| (g.static_context_id, g.rows.iter().map(|r| r.static_trace_id).collect()))
        .collect();
    assert_eq!(summary, vec![(1, vec![1, 2]), (2, vec![3, 4, 5]), (3, vec![6])]);
}

#[test]
fn test_context_stacks() {
    let store = sample_store();
    let stacks = build_context_stacks(&store).unwrap();

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();
    assert_eq!(lines, vec!["main;foo 4", "main 2", "main;foo;bar 1"]);

    let total: u64 = stacks.iter().map(|s| s.weight).sum();
    assert_eq!(total, store.traces().len() as u64);
}

#[test]
fn test_context_stacks_propagate_missing_context() {
    let mut export = sample_export();
    export["traces"]
        .as_array_mut()
        .unwrap()
        .push(json!({"contextId": 42, "staticTraceId": 1}));
    let store = CollectionStore::new(parse_raw_data(&export).unwrap()).unwrap();

    assert_eq!(
        build_context_stacks(&store),
        Err(QueryError::ContextNotFound { context_id: 42 })
    );
}

#[test]
fn test_hot_contexts_from_store() {
    let store = sample_store();
    let stacks = build_context_stacks(&store).unwrap();
    let hot = calculate_hot_contexts(&stacks, store.traces().len() as u64, 2);

    assert_eq!(hot.len(), 2);
    assert_eq!(hot[0].stack, "main;foo");
    assert_eq!(hot[0].traces, 4);

    let dist = calculate_trace_distribution(&stacks);
    assert_eq!(dist.total_traces, 7);
    assert_eq!(dist.stack_count, 3);
    assert_eq!(dist.median_traces_per_stack, 2);
}

#[test]
fn test_unique_column_values_idempotent() {
    let store = sample_store();
    let first = store
        .get_unique_column_values(CollectionName::Traces, "contextId")
        .unwrap();
    let second = store
        .get_unique_column_values(CollectionName::Traces, "contextId")
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert!(first.contains(&ColumnValue::Int(4)));
}
