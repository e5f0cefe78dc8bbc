//! Parser integration tests.
//!
//! Verifies that the parser builds the expected trees from expression text,
//! and that binding strings split into the expected pairs.

use rbind_ast::node::{Expr, PropertySegment};
use rbind_ast::operators::{BinaryOperator, UnaryOperator};
use rbind_core::Value;
use rbind_parser::{
    parse, parse_binding_string, parse_expression, parse_expression_with_depth, BindingTypes,
    ParseError,
};

/// Helper: parse and re-serialize, which shows the tree's grouping.
fn reprint(source: &str) -> String {
    parse_expression(source)
        .unwrap_or_else(|e| panic!("parse of {:?} failed: {}", source, e))
        .to_string()
}

/// Helper: parse and return the node tag.
fn kind_of(source: &str) -> &'static str {
    parse_expression(source).expect("parse failed").kind_name()
}

/// Helper: split a binding string with the built-in types into (type, target) pairs.
fn pairs(text: &str) -> Vec<(String, String)> {
    parse_binding_string(text, &BindingTypes::builtin())
        .expect("binding parse failed")
        .into_iter()
        .map(|p| (p.binding_type, p.target))
        .collect()
}

fn binary_parts(expr: &Expr) -> (&Expr, BinaryOperator, &Expr) {
    match expr {
        Expr::Logical(b) | Expr::Comparison(b) | Expr::Arithmetic(b) => (&b.left, b.operator, &b.right),
        other => panic!("not a binary node: {:?}", other),
    }
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_parse_literals() {
    assert_eq!(parse_expression("42").unwrap(), Expr::literal(42.0));
    assert_eq!(parse_expression(".5").unwrap(), Expr::literal(0.5));
    assert_eq!(parse_expression("'hi'").unwrap(), Expr::literal("hi"));
    assert_eq!(parse_expression("true").unwrap(), Expr::literal(true));
    assert_eq!(parse_expression("null").unwrap(), Expr::literal(Value::Null));
    assert_eq!(parse_expression("undefined").unwrap(), Expr::literal(Value::Undefined));
}

#[test]
fn test_parse_empty_token_stream() {
    assert_eq!(parse(rbind_scanner::tokenize("").unwrap()).unwrap(), None);
    assert!(matches!(parse_expression(""), Err(ParseError::Expected { .. })));
}

#[test]
fn test_parse_array_literal() {
    match parse_expression("[1, 'two', [3]]").unwrap() {
        Expr::Array { elements } => {
            assert_eq!(elements.len(), 3);
            assert_eq!(elements[2].kind_name(), "array");
        }
        other => panic!("expected array, got {:?}", other),
    }
    assert_eq!(reprint("[]"), "[]");
    assert_eq!(reprint("[1, 2,]"), "[1, 2]");
}

#[test]
fn test_parse_object_literal_keys() {
    match parse_expression("{ a: 1, 'b c': x, 2: y, true: z }").unwrap() {
        Expr::Object { pairs } => {
            let keys: Vec<&str> = pairs.iter().map(|p| p.key.as_str()).collect();
            assert_eq!(keys, vec!["a", "b c", "2", "true"]);
        }
        other => panic!("expected object, got {:?}", other),
    }
}

// ============================================================================
// Precedence and Associativity
// ============================================================================

#[test]
fn test_multiplicative_binds_tighter() {
    let expr = parse_expression("2 + 3 * 4").unwrap();
    let (left, op, right) = binary_parts(&expr);
    assert_eq!(op, BinaryOperator::Add);
    assert_eq!(left, &Expr::literal(2.0));
    assert_eq!(right.kind_name(), "arithmetic");
}

#[test]
fn test_left_associativity() {
    let expr = parse_expression("10 - 4 - 3").unwrap();
    let (left, op, right) = binary_parts(&expr);
    assert_eq!(op, BinaryOperator::Sub);
    assert_eq!(left.to_string(), "10 - 4");
    assert_eq!(right, &Expr::literal(3.0));
}

#[test]
fn test_logical_precedence() {
    let expr = parse_expression("a || b && c").unwrap();
    let (_, op, right) = binary_parts(&expr);
    assert_eq!(op, BinaryOperator::Or);
    assert_eq!(right.kind_name(), "logical");
    assert_eq!(kind_of("a == b && c < d"), "logical");
    assert_eq!(kind_of("a + 1 < b"), "comparison");
}

#[test]
fn test_ternary_is_right_associative() {
    match parse_expression("a ? b : c ? d : e").unwrap() {
        Expr::Ternary { false_value, .. } => assert_eq!(false_value.kind_name(), "ternary"),
        other => panic!("expected ternary, got {:?}", other),
    }
}

#[test]
fn test_ternary_condition_takes_whole_binary() {
    match parse_expression("count > 0 && ready ? 'yes' : 'no'").unwrap() {
        Expr::Ternary { condition, .. } => assert_eq!(condition.kind_name(), "logical"),
        other => panic!("expected ternary, got {:?}", other),
    }
}

#[test]
fn test_unary_operators() {
    match parse_expression("!!done").unwrap() {
        Expr::Unary { operator, operand } => {
            assert_eq!(operator, UnaryOperator::Not);
            assert_eq!(operand.kind_name(), "unary");
        }
        other => panic!("expected unary, got {:?}", other),
    }
    assert_eq!(reprint("-a * 2"), "-a * 2");
    assert_eq!(kind_of("-a * 2"), "arithmetic");
}

#[test]
fn test_parentheses_are_kept() {
    assert_eq!(kind_of("(2 + 3) * 4"), "arithmetic");
    assert_eq!(reprint("(2 + 3) * 4"), "(2 + 3) * 4");
}

// ============================================================================
// Property Paths and Postfix Chains
// ============================================================================

#[test]
fn test_property_path_normalization() {
    match parse_expression("todos[0].title").unwrap() {
        Expr::Property(path) => {
            assert_eq!(path.path, "todos[0].title");
            assert_eq!(path.segments.len(), 3);
        }
        other => panic!("expected property, got {:?}", other),
    }
    assert_eq!(reprint("user['name']"), "user.name");
    assert_eq!(reprint("map['first name']"), "map['first name']");
    assert_eq!(reprint("items['2']"), "items[2]");
}

#[test]
fn test_computed_bracket_is_reserialized() {
    match parse_expression("rows[selected.id].label").unwrap() {
        Expr::Property(path) => {
            assert_eq!(path.path, "rows[selected.id].label");
            assert!(matches!(path.segments[1], PropertySegment::Computed(_)));
        }
        other => panic!("expected property, got {:?}", other),
    }
}

#[test]
fn test_method_call_chain() {
    let expr = parse_expression("a.b[0].c()").unwrap();
    match &expr {
        Expr::MethodCall {
            object,
            method,
            arguments,
        } => {
            assert_eq!(method, "c");
            assert!(arguments.is_empty());
            assert_eq!(object.to_string(), "a.b[0]");
        }
        other => panic!("expected method call, got {:?}", other),
    }
}

#[test]
fn test_method_call_arguments() {
    match parse_expression("tags.includes('x', 1 + 1)").unwrap() {
        Expr::MethodCall { arguments, .. } => assert_eq!(arguments.len(), 2),
        other => panic!("expected method call, got {:?}", other),
    }
}

#[test]
fn test_postfix_on_parenthesized() {
    assert_eq!(kind_of("(a || b).length"), "member");
    assert_eq!(kind_of("[1, 2][0]"), "index");
    assert_eq!(kind_of("list.join(', ').length"), "member");
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_closing_paren() {
    match parse_expression("(a + b") {
        Err(ParseError::Expected { expected, found, .. }) => {
            assert_eq!(expected, "')'");
            assert_eq!(found, "end of expression");
        }
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn test_missing_ternary_colon() {
    let err = parse_expression("a ? b c").unwrap_err();
    assert!(matches!(err, ParseError::Expected { ref expected, .. } if expected == "':'"));
}

#[test]
fn test_missing_property_name() {
    let err = parse_expression("user.").unwrap_err();
    assert!(matches!(err, ParseError::MissingPropertyName { .. }));
    let err = parse_expression("user.'x'").unwrap_err();
    assert!(matches!(err, ParseError::MissingPropertyName { .. }));
}

#[test]
fn test_unterminated_string() {
    assert!(matches!(parse_expression("'abc"), Err(ParseError::Scan(_))));
}

#[test]
fn test_trailing_tokens_rejected() {
    let err = parse_expression("a b").unwrap_err();
    match err {
        ParseError::UnexpectedToken { found, span } => {
            assert_eq!(found, "identifier 'b'");
            assert_eq!(span.start, 2);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_free_function_call_rejected() {
    assert!(matches!(
        parse_expression("alert(1)"),
        Err(ParseError::UnexpectedToken { .. })
    ));
}

#[test]
fn test_depth_limit() {
    let deep = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert!(parse_expression(&deep).is_ok());
    assert!(matches!(
        parse_expression_with_depth(&deep, 20),
        Err(ParseError::TooDeep { .. })
    ));
}

#[test]
fn test_depth_limit_counts_every_node() {
    // Each `1+(` level adds an arithmetic node and a parentheses node.
    let nested = |n: usize| format!("{}1{}", "1+(".repeat(n), ")".repeat(n));
    assert_eq!(parse_expression(&nested(99)).unwrap().depth(), 199);
    assert!(matches!(
        parse_expression(&nested(100)),
        Err(ParseError::TooDeep { .. })
    ));

    let chain = vec!["1"; 8].join(" + ");
    assert_eq!(parse_expression(&chain).unwrap().depth(), 8);
    assert!(parse_expression_with_depth(&chain, 8).is_ok());
    assert!(matches!(
        parse_expression_with_depth(&chain, 7),
        Err(ParseError::TooDeep { .. })
    ));
}

#[test]
fn test_parse_is_deterministic() {
    let source = "items.length > 0 ? items[0].name : 'none'";
    assert_eq!(parse_expression(source).unwrap(), parse_expression(source).unwrap());
}

// ============================================================================
// Binding Strings
// ============================================================================

#[test]
fn test_binding_pairs() {
    assert_eq!(
        pairs("text: name, visible: count > 0"),
        vec![
            ("text".to_string(), "name".to_string()),
            ("visible".to_string(), "count > 0".to_string()),
        ]
    );
}

#[test]
fn test_binding_target_keeps_inner_colons_and_commas() {
    assert_eq!(
        pairs("attr: { title: a ? b : c, id: [1, 2] }, text: f ? 'x,y' : 'z'"),
        vec![
            ("attr".to_string(), "{ title: a ? b : c, id: [1, 2] }".to_string()),
            ("text".to_string(), "f ? 'x,y' : 'z'".to_string()),
        ]
    );
}

#[test]
fn test_binding_modifiers() {
    let parsed = parse_binding_string("click.prevent: save", &BindingTypes::builtin()).unwrap();
    assert_eq!(parsed[0].binding_type, "click.prevent");
    assert_eq!(parsed[0].base_type(), "click");
    assert_eq!(parsed[0].modifiers().collect::<Vec<_>>(), vec!["prevent"]);
}

#[test]
fn test_binding_event_types() {
    assert_eq!(
        pairs("value: name, change: save"),
        vec![
            ("value".to_string(), "name".to_string()),
            ("change".to_string(), "save".to_string()),
        ]
    );
    let parsed = parse_binding_string("keyup.enter: submit", &BindingTypes::builtin()).unwrap();
    assert_eq!(parsed[0].base_type(), "keyup");
    assert_eq!(parsed[0].modifiers().collect::<Vec<_>>(), vec!["enter"]);
    for text in ["input: onInput", "blur: leave", "keydown: k"] {
        assert_eq!(pairs(text).len(), 1, "{}", text);
    }
}

#[test]
fn test_binding_trailing_comma_ignored() {
    assert_eq!(pairs("text: a,").len(), 1);
    assert!(pairs("  ").is_empty());
}

#[test]
fn test_binding_unknown_type() {
    let err = parse_binding_string("a ? b : c", &BindingTypes::builtin()).unwrap_err();
    assert!(matches!(err, ParseError::MissingBindingType { .. }));
    let err = parse_binding_string("tooltip: hint", &BindingTypes::builtin()).unwrap_err();
    assert!(matches!(err, ParseError::MissingBindingType { .. }));
}

#[test]
fn test_binding_extra_types() {
    let types = BindingTypes::with_extra(["tooltip"]);
    let parsed = parse_binding_string("tooltip: hint", &types).unwrap();
    assert_eq!(parsed[0].binding_type, "tooltip");
}

#[test]
fn test_binding_errors() {
    let types = BindingTypes::builtin();
    assert!(matches!(
        parse_binding_string("text:", &types),
        Err(ParseError::EmptyBindingTarget { .. })
    ));
    assert!(matches!(
        parse_binding_string("text: f(a", &types),
        Err(ParseError::UnbalancedBinding { .. })
    ));
    assert!(matches!(
        parse_binding_string("text: a]", &types),
        Err(ParseError::UnbalancedBinding { .. })
    ));
    assert!(matches!(
        parse_binding_string("text: 'abc", &types),
        Err(ParseError::UnterminatedBindingString { .. })
    ));
}

#[test]
fn test_binding_pair_serializes_type_field() {
    let parsed = parse_binding_string("if: ready", &BindingTypes::builtin()).unwrap();
    let json = serde_json::to_value(&parsed).unwrap();
    assert_eq!(json, serde_json::json!([{ "type": "if", "target": "ready" }]));
}
