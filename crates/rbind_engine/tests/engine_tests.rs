//! Engine integration tests: caching, option plumbing, and binding passes.

use rbind_binder::{ForeachFrame, PositionId, ScopeTree};
use rbind_core::Value;
use rbind_engine::{BindingSet, Engine, EngineError};
use rbind_evaluator::EvalError;
use rbind_options::{parse_options, EngineOptions};
use rbind_parser::parse_expression;
use rbind_reactive::ReactiveStore;
use serde_json::json;
use std::sync::Arc;

fn data(json: serde_json::Value) -> Value {
    Value::from(json)
}

/// Helper: `todo in todos` at index 1.
fn todo_tree() -> (ScopeTree, PositionId) {
    let mut tree = ScopeTree::new();
    let position = tree.add_iteration(None, ForeachFrame::new("todo", "todos", 1).with_index_alias("i"));
    (tree, position)
}

fn todos() -> Value {
    data(json!({
        "todos": [
            {"title": "Write tests", "done": true},
            {"title": "Buy milk", "done": false}
        ],
        "filter": "all"
    }))
}

// ============================================================================
// Caches
// ============================================================================

#[test]
fn test_cached_parse_matches_uncached() {
    let mut engine = Engine::default();
    let cached = engine.parse_expression("  count > 0 ? items[0].name : 'none' ").unwrap();
    let fresh = parse_expression("count > 0 ? items[0].name : 'none'").unwrap();
    assert_eq!(*cached, fresh);
}

#[test]
fn test_expression_cache_hits_share_the_tree() {
    let mut engine = Engine::default();
    let first = engine.parse_expression("a + b").unwrap();
    let second = engine.parse_expression(" a + b").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let stats = engine.expression_stats();
    assert_eq!((stats.hits, stats.misses, stats.evictions), (1, 1, 0));
}

#[test]
fn test_failed_parse_is_not_cached() {
    let mut engine = Engine::default();
    assert!(engine.parse_expression("a +").is_err());
    assert!(engine.parse_expression("a +").is_err());
    assert_eq!(engine.expression_stats().misses, 2);
}

#[test]
fn test_cache_size_from_options() {
    let options = parse_options(r#"{ "expressionCacheSize": 1 }"#).unwrap();
    let mut engine = Engine::new(options);
    engine.parse_expression("a").unwrap();
    engine.parse_expression("b").unwrap();
    let first_again = engine.parse_expression("a").unwrap();
    assert_eq!(engine.expression_stats().evictions, 2);
    assert_eq!(*first_again, parse_expression("a").unwrap());
}

#[test]
fn test_binding_cache() {
    let mut engine = Engine::default();
    let first = engine.parse_bindings("text: name, visible: shown").unwrap();
    let second = engine.parse_bindings("text: name, visible: shown  ").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].binding_type, "visible");
    assert_eq!(engine.binding_stats().hits, 1);
}

#[test]
fn test_extra_binding_types() {
    let mut engine = Engine::default();
    assert!(engine.parse_bindings("tooltip: hint").is_err());

    let options = EngineOptions {
        extra_binding_types: vec!["tooltip".to_string()],
        ..EngineOptions::default()
    };
    let mut engine = Engine::new(options);
    assert!(engine.binding_types().contains("tooltip"));
    let pairs = engine.parse_bindings("tooltip: hint").unwrap();
    assert_eq!(pairs[0].target, "hint");
}

// ============================================================================
// Evaluation and Settings
// ============================================================================

#[test]
fn test_evaluate() {
    let mut engine = Engine::default();
    let scope = todos();
    assert_eq!(
        engine.evaluate("todos.length + ' items'", &scope, None),
        Ok(Value::from("2 items"))
    );
    assert!(matches!(
        engine.evaluate("todos.", &scope, None),
        Err(EngineError::Parse(_))
    ));
}

#[test]
fn test_evaluate_with_resolver() {
    let mut engine = Engine::default();
    let scope = todos();
    let (tree, position) = todo_tree();
    let resolver = engine.resolver(&tree, position);
    assert_eq!(
        engine.evaluate("todo.title + ' #' + i", &scope, Some(&resolver)),
        Ok(Value::from("Buy milk #1"))
    );

    let lost = engine.resolver(&tree, PositionId(42));
    assert!(matches!(
        engine.evaluate("todo.title", &scope, Some(&lost)),
        Err(EngineError::Eval(EvalError::Resolve(_)))
    ));
}

#[test]
fn test_parent_token_from_options() {
    let options = parse_options(r#"{ "parentToken": "$up" }"#).unwrap();
    let mut engine = Engine::new(options);
    let scope = data(json!({"rows": [{"cells": ["a", "b"]}], "item": "root"}));

    let mut tree = ScopeTree::new();
    let row = tree.add_iteration(None, ForeachFrame::new("item", "rows", 0));
    let cell = tree.add_iteration(Some(row), ForeachFrame::new("item", "item.cells", 1));
    let resolver = engine.resolver(&tree, cell);

    assert_eq!(engine.evaluate("item", &scope, Some(&resolver)), Ok(Value::from("b")));
    assert_eq!(
        engine.evaluate("$up.item.cells.length", &scope, Some(&resolver)),
        Ok(Value::from(2))
    );
}

#[test]
fn test_stage_settings_follow_options() {
    let options = parse_options(
        r#"{ "exclusionPrefix": "$$", "simpleEditCeiling": 4, "smallEditThreshold": 1 }"#,
    )
    .unwrap();
    let engine = Engine::new(options);
    assert_eq!(engine.reactive_config().exclusion_prefix, "$$");
    let policy = engine.reconcile_policy();
    assert_eq!((policy.simple_edit_ceiling, policy.small_edit_threshold), (4, 1));
    assert_eq!(engine.list_reconciler().policy(), &policy);
}

#[test]
fn test_max_depth_from_options() {
    let options = parse_options(r#"{ "maxDepth": 5 }"#).unwrap();
    let mut engine = Engine::new(options);
    assert!(engine.parse_expression("((((((((1))))))))").is_err());
    assert!(engine.parse_expression("(1)").is_ok());
}

#[test]
fn test_accepted_expressions_always_evaluate() {
    let mut engine = Engine::default();
    let scope = data(json!({"xs": [1, 2], "flag": true}));
    let shapes: [fn(usize) -> String; 5] = [
        |n| format!("{}1{}", "1+(".repeat(n), ")".repeat(n)),
        |n| vec!["1"; n].join(" + "),
        |n| format!("{}flag", "!".repeat(n)),
        |n| format!("{}1{}", "flag ? (".repeat(n), ") : 0".repeat(n)),
        |n| format!("{}xs{}", "[".repeat(n), "]".repeat(n)),
    ];

    for shape in shapes {
        let mut accepted = 0;
        for n in [1, 50, 99, 100, 101, 150, 199, 200, 250] {
            let text = shape(n);
            match engine.evaluate(&text, &scope, None) {
                Ok(_) => accepted += 1,
                Err(EngineError::Parse(_)) => {}
                Err(EngineError::Eval(e)) => panic!("{:?} parsed but failed to evaluate: {}", text, e),
            }
        }
        assert!(accepted > 0);
    }
}

// ============================================================================
// Binding Sets
// ============================================================================

#[test]
fn test_first_pass_reports_every_binding() {
    let mut engine = Engine::default();
    let scope = todos();
    let mut set = BindingSet::new(&mut engine, "text: filter, visible: todos.length > 0");
    let updates = set.update(&mut engine, &scope, None);

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].previous, None);
    assert_eq!(updates[0].value, Value::from("all"));
    assert_eq!(set.value("visible"), Some(&Value::from(true)));
    assert!(set.diagnostics().is_empty());
}

#[test]
fn test_unchanged_bindings_are_skipped() {
    let mut engine = Engine::default();
    let mut set = BindingSet::new(&mut engine, "text: filter, visible: todos.length > 0, ratio: 0 / 0");
    set.update(&mut engine, &todos(), None);
    assert!(set.update(&mut engine, &todos(), None).is_empty());

    let changed = data(json!({"todos": [], "filter": "all"}));
    let updates = set.update(&mut engine, &changed, None);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].pair.binding_type, "visible");
    assert_eq!(updates[0].previous, Some(Value::from(true)));
    assert_eq!(updates[0].value, Value::from(false));
}

#[test]
fn test_bad_expression_does_not_stop_the_pass() {
    let mut engine = Engine::default();
    let mut set = BindingSet::new(&mut engine, "visible: todos.length >, text: filter");
    let updates = set.update(&mut engine, &todos(), None);

    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].pair.binding_type, "text");
    assert_eq!(set.value("visible"), None);

    let codes: Vec<u32> = set.diagnostics().diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![1002, 2002]);
    let first = &set.diagnostics().diagnostics()[0];
    assert_eq!(first.binding.as_deref(), Some("visible"));
    assert_eq!(first.source.as_deref(), Some("todos.length >"));
    assert!(first.span.is_some());
}

#[test]
fn test_failed_evaluation_keeps_previous_value() {
    let mut engine = Engine::default();
    let scope = todos();
    let (tree, position) = todo_tree();
    let mut set = BindingSet::new(&mut engine, "text: todo.title, css: 'row'");

    let resolver = engine.resolver(&tree, position);
    set.update(&mut engine, &scope, Some(&resolver));
    assert_eq!(set.value("text"), Some(&Value::from("Buy milk")));

    let lost = engine.resolver(&tree, PositionId(9));
    let updates = set.update(&mut engine, &scope, Some(&lost));
    assert!(updates.is_empty());
    assert_eq!(set.value("text"), Some(&Value::from("Buy milk")));
    assert!(set.diagnostics().has_errors());
    let codes: Vec<u32> = set.diagnostics().diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![2001, 2002]);
}

#[test]
fn test_malformed_binding_string() {
    let mut engine = Engine::default();
    let mut set = BindingSet::new(&mut engine, "text: (name");
    assert!(set.is_empty());
    assert_eq!(set.diagnostics().len(), 1);
    assert_eq!(set.diagnostics().diagnostics()[0].code, 1001);

    assert!(set.update(&mut engine, &todos(), None).is_empty());
    assert_eq!(set.diagnostics().len(), 1);
}

#[test]
fn test_binding_pass_over_reactive_store() {
    let mut engine = Engine::default();
    let mut store = ReactiveStore::new(todos(), engine.reactive_config());
    let mut set = BindingSet::new(&mut engine, "text: todos[1].done ? 'done' : 'open'");
    assert_eq!(set.update(&mut engine, &store, None)[0].value, Value::from("open"));

    store.set("todos[1].done", Value::from(true)).unwrap();
    let updates = set.update(&mut engine, &store, None);
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].value, Value::from("done"));
}
