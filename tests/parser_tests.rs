// tests/parser_tests.rs

use eql_front::ast::{
    ArithmeticOp, ComparisonOp, EventCategory, Expr, ExprKind, Literal, LogicalOp, Position,
    PredicateKind, Query, Statement, TimeUnit, TokenKind, UnaryOp,
};
use eql_front::config::ParserConfig;
use eql_front::error::ParseError;
use eql_front::lexer::tokenize;
use eql_front::parse_tree::{
    BooleanExpressionNode, PredicateForm, QueryNode, ValueExpressionNode,
};
use eql_front::parser::{EqlParser, Parser};
use eql_front::{parse_expression, parse_statement};
use rust_decimal::Decimal;

fn expr(input: &str) -> Expr {
    parse_expression(input).unwrap_or_else(|e| panic!("{input:?} failed: {e}"))
}

fn statement(input: &str) -> Statement {
    parse_statement(input).unwrap_or_else(|e| panic!("{input:?} failed: {e}"))
}

fn field(e: &Expr) -> String {
    match &e.kind {
        ExprKind::QualifiedName(name) => name.path().join("."),
        other => panic!("Expected field, got {:?}", other),
    }
}

fn integer(e: &Expr) -> i64 {
    match e.as_literal() {
        Some(Literal::Integer(n)) => *n,
        other => panic!("Expected integer, got {:?}", other),
    }
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    // Should be: Or(a, And(b, c))
    match expr("a or b and c").kind {
        ExprKind::LogicalBinary {
            op: LogicalOp::Or,
            left,
            right,
        } => {
            assert_eq!(field(&left), "a");
            match right.kind {
                ExprKind::LogicalBinary {
                    op: LogicalOp::And,
                    left,
                    right,
                } => {
                    assert_eq!(field(&left), "b");
                    assert_eq!(field(&right), "c");
                }
                _ => panic!("Expected and on the right"),
            }
        }
        _ => panic!("Expected or"),
    }
}

#[test]
fn test_not_binds_tighter_than_and() {
    // Should be: And(Not(a), b)
    match expr("not a and b").kind {
        ExprKind::LogicalBinary {
            op: LogicalOp::And,
            left,
            right,
        } => {
            assert!(matches!(left.kind, ExprKind::LogicalNot(_)));
            assert_eq!(field(&right), "b");
        }
        _ => panic!("Expected and"),
    }
}

#[test]
fn test_not_applies_to_comparison() {
    match expr("not a == 1").kind {
        ExprKind::LogicalNot(operand) => {
            assert!(matches!(
                operand.kind,
                ExprKind::Comparison {
                    op: ComparisonOp::Equal,
                    ..
                }
            ));
        }
        _ => panic!("Expected not"),
    }
}

#[test]
fn test_logical_operators_are_left_associative() {
    assert_eq!(expr("a or b or c"), expr("(a or b) or c"));
    assert_ne!(expr("a or b or c"), expr("a or (b or c)"));
    assert_eq!(expr("a and b and c"), expr("(a and b) and c"));
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    // Should be: Add(1, Multiply(2, 3))
    match expr("1 + 2 * 3").kind {
        ExprKind::ArithmeticBinary {
            op: ArithmeticOp::Add,
            left,
            right,
        } => {
            assert_eq!(integer(&left), 1);
            match right.kind {
                ExprKind::ArithmeticBinary {
                    op: ArithmeticOp::Multiply,
                    left,
                    right,
                } => {
                    assert_eq!(integer(&left), 2);
                    assert_eq!(integer(&right), 3);
                }
                _ => panic!("Expected multiplication"),
            }
        }
        _ => panic!("Expected addition"),
    }
}

#[test]
fn test_unary_minus_binds_tightest() {
    // Should be: Add(Negate(1), 2)
    match expr("-1 + 2").kind {
        ExprKind::ArithmeticBinary {
            op: ArithmeticOp::Add,
            left,
            right,
        } => {
            match left.kind {
                ExprKind::ArithmeticUnary {
                    op: UnaryOp::Negate,
                    operand,
                } => assert_eq!(integer(&operand), 1),
                _ => panic!("Expected negation on the left"),
            }
            assert_eq!(integer(&right), 2);
        }
        _ => panic!("Expected addition"),
    }
}

#[test]
fn test_arithmetic_is_left_associative() {
    assert_eq!(expr("a - b - c"), expr("(a - b) - c"));
    assert_eq!(expr("a / b * c"), expr("(a / b) * c"));
    assert_eq!(expr("a % b + c * d"), expr("(a % b) + (c * d)"));
}

#[test]
fn test_parentheses_override_precedence() {
    match expr("(1 + 2) * 3").kind {
        ExprKind::ArithmeticBinary {
            op: ArithmeticOp::Multiply,
            left,
            ..
        } => assert!(matches!(
            left.kind,
            ExprKind::ArithmeticBinary {
                op: ArithmeticOp::Add,
                ..
            }
        )),
        _ => panic!("Expected multiplication"),
    }
}

#[test]
fn test_comparison_binds_looser_than_arithmetic() {
    match expr("a + 1 >= b * 2").kind {
        ExprKind::Comparison {
            op: ComparisonOp::GreaterEqual,
            left,
            right,
        } => {
            assert!(matches!(left.kind, ExprKind::ArithmeticBinary { .. }));
            assert!(matches!(right.kind, ExprKind::ArithmeticBinary { .. }));
        }
        _ => panic!("Expected comparison"),
    }
}

#[test]
fn test_comparison_operators() {
    let test_cases = vec![
        ("a == 1", ComparisonOp::Equal),
        ("a != 1", ComparisonOp::NotEqual),
        ("a < 1", ComparisonOp::LessThan),
        ("a <= 1", ComparisonOp::LessEqual),
        ("a > 1", ComparisonOp::GreaterThan),
        ("a >= 1", ComparisonOp::GreaterEqual),
    ];

    for (input, expected) in test_cases {
        match expr(input).kind {
            ExprKind::Comparison { op, .. } => assert_eq!(op, expected, "input: {}", input),
            _ => panic!("Expected comparison for {}", input),
        }
    }
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn test_in_predicate() {
    match expr("pid in (1, 2, 3)").kind {
        ExprKind::Predicate {
            kind: PredicateKind::In,
            negated: false,
            value,
            list,
        } => {
            assert_eq!(field(&value), "pid");
            assert_eq!(list.len(), 3);
        }
        _ => panic!("Expected in predicate"),
    }
}

#[test]
fn test_not_in_is_a_single_predicate() {
    match expr("pid not in (1, 2)").kind {
        ExprKind::Predicate {
            kind: PredicateKind::In,
            negated: true,
            list,
            ..
        } => assert_eq!(list.len(), 2),
        _ => panic!("Expected negated in predicate"),
    }
}

#[test]
fn test_not_in_insensitive() {
    assert!(matches!(
        expr("name not in~ (\"A\")").kind,
        ExprKind::Predicate {
            kind: PredicateKind::InInsensitive,
            negated: true,
            ..
        }
    ));
}

#[test]
fn test_in_list_accepts_expressions() {
    match expr("a in (b + 1, f(c))").kind {
        ExprKind::Predicate { list, .. } => {
            assert!(matches!(list[0].kind, ExprKind::ArithmeticBinary { .. }));
            assert!(matches!(list[1].kind, ExprKind::FunctionCall { .. }));
        }
        _ => panic!("Expected predicate"),
    }
}

#[test]
fn test_pattern_predicates() {
    let test_cases = vec![
        ("name like \"*.exe\"", PredicateKind::Like),
        ("name like~ \"*.exe\"", PredicateKind::LikeInsensitive),
        ("name regex \".*\"", PredicateKind::Regex),
        ("name regex~ \".*\"", PredicateKind::RegexInsensitive),
        ("name : \"cmd.exe\"", PredicateKind::Seq),
    ];

    for (input, expected) in test_cases {
        match expr(input).kind {
            ExprKind::Predicate {
                kind,
                negated,
                list,
                ..
            } => {
                assert_eq!(kind, expected, "input: {}", input);
                assert!(!negated);
                assert_eq!(list.len(), 1);
            }
            _ => panic!("Expected predicate for {}", input),
        }
    }
}

#[test]
fn test_pattern_constant_list() {
    match expr("name like~ (\"*.exe\", \"*.dll\")").kind {
        ExprKind::Predicate { list, .. } => {
            let values: Vec<_> = list.iter().map(|e| e.as_literal().cloned()).collect();
            assert_eq!(
                values,
                vec![
                    Some(Literal::String("*.exe".to_string())),
                    Some(Literal::String("*.dll".to_string())),
                ]
            );
        }
        _ => panic!("Expected predicate"),
    }
}

#[test]
fn test_single_pattern_equals_one_element_list() {
    assert_eq!(expr("name like \"x\""), expr("name like (\"x\")"));
}

#[test]
fn test_pattern_list_only_takes_constants() {
    let err = parse_expression("name like (other)").unwrap_err();
    assert!(matches!(err, ParseError::Syntax(_)));
}

#[test]
fn test_not_like_is_not_a_predicate() {
    // `not` after a value only introduces `not in`
    let err = parse_expression("name not like \"x\"").unwrap_err();
    match err {
        ParseError::Syntax(e) => assert_eq!(e.found_kind, TokenKind::Not),
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

// ============================================================================
// Primary expressions
// ============================================================================

#[test]
fn test_qualified_name_with_indices() {
    let e = expr("a.b[1][2]");
    let name = e.as_name().expect("Expected name");
    assert_eq!(name.segments.len(), 2);
    assert_eq!(name.segments[0].name, "a");
    assert!(name.segments[0].indices.is_empty());
    assert_eq!(name.segments[1].name, "b");
    assert_eq!(name.segments[1].indices, vec![1, 2]);
    assert_eq!(name.indices(), vec![1, 2]);
}

#[test]
fn test_index_in_the_middle_of_a_name() {
    let e = expr("process.args[0].value");
    let name = e.as_name().expect("Expected name");
    assert_eq!(name.path(), vec!["process", "args", "value"]);
    assert_eq!(name.segments[1].indices, vec![0]);
}

#[test]
fn test_quoted_identifier_allows_keywords() {
    let e = expr("`sequence`.`process name` == 1");
    match e.kind {
        ExprKind::Comparison { left, .. } => {
            assert_eq!(
                left.as_name().map(|n| n.path().join("/")),
                Some("sequence/process name".to_string())
            );
        }
        _ => panic!("Expected comparison"),
    }
}

#[test]
fn test_function_calls() {
    match expr("length(process.name)").kind {
        ExprKind::FunctionCall {
            name,
            case_insensitive,
            args,
        } => {
            assert_eq!(name, "length");
            assert!(!case_insensitive);
            assert_eq!(args.len(), 1);
        }
        _ => panic!("Expected function call"),
    }

    match expr("startsWith~(name, \"cmd\")").kind {
        ExprKind::FunctionCall {
            name,
            case_insensitive,
            args,
        } => {
            assert_eq!(name, "startsWith");
            assert!(case_insensitive);
            assert_eq!(args.len(), 2);
        }
        _ => panic!("Expected function call"),
    }

    assert!(matches!(
        expr("now()").kind,
        ExprKind::FunctionCall { ref args, .. } if args.is_empty()
    ));
}

#[test]
fn test_literals() {
    assert_eq!(expr("null").as_literal(), Some(&Literal::Null));
    assert_eq!(expr("true").as_literal(), Some(&Literal::Boolean(true)));
    assert_eq!(expr("false").as_literal(), Some(&Literal::Boolean(false)));
    assert_eq!(expr("42").as_literal(), Some(&Literal::Integer(42)));
    assert_eq!(
        expr("1.5").as_literal(),
        Some(&Literal::Decimal(Decimal::new(15, 1)))
    );
    assert_eq!(
        expr("2E3").as_literal(),
        Some(&Literal::Decimal(Decimal::new(2000, 0)))
    );
    assert_eq!(
        expr(r#""C:\\Windows""#).as_literal(),
        Some(&Literal::String(r"C:\Windows".to_string()))
    );
}

#[test]
fn test_largest_integer() {
    assert_eq!(
        expr("9223372036854775807").as_literal(),
        Some(&Literal::Integer(i64::MAX))
    );
}

#[test]
fn test_integer_too_large() {
    match parse_expression("a == 9223372036854775808").unwrap_err() {
        ParseError::Invalid { position, message } => {
            assert_eq!(position, Position::new(1, 6, 5));
            assert_eq!(message, "Number [9223372036854775808] is too large");
        }
        other => panic!("Expected invalid number, got {:?}", other),
    }
}

#[test]
fn test_process_check() {
    match expr("descendant of [process where name == \"explorer.exe\"]").kind {
        ExprKind::ProcessCheck {
            relationship,
            subquery,
        } => {
            assert_eq!(relationship, "descendant");
            assert_eq!(subquery.category, EventCategory::Named("process".to_string()));
        }
        _ => panic!("Expected process check"),
    }
}

#[test]
fn test_process_check_combines_with_and() {
    match expr("child of [process where true] and pid == 1").kind {
        ExprKind::LogicalBinary {
            op: LogicalOp::And,
            left,
            ..
        } => assert!(matches!(left.kind, ExprKind::ProcessCheck { .. })),
        _ => panic!("Expected and"),
    }
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_event_query() {
    let s = statement("process where process.pid == 4");
    match s.query {
        Query::Event(event) => {
            assert_eq!(
                event.filter.category,
                EventCategory::Named("process".to_string())
            );
            assert!(matches!(
                event.filter.condition.kind,
                ExprKind::Comparison { .. }
            ));
        }
        _ => panic!("Expected event query"),
    }
    assert!(s.pipes.is_empty());
}

#[test]
fn test_event_categories() {
    match statement("any where true").query {
        Query::Event(event) => assert_eq!(event.filter.category, EventCategory::Any),
        _ => panic!("Expected event query"),
    }
    assert_eq!(
        statement("\"network\" where true"),
        statement("network where true")
    );
}

#[test]
fn test_sequence_terms_and_until() {
    match statement("sequence [a where true] [b where true]").query {
        Query::Sequence(sequence) => {
            assert_eq!(sequence.terms.len(), 2);
            assert!(sequence.until.is_none());
            assert!(sequence.join_keys.is_none());
            assert!(sequence.max_span.is_none());
        }
        _ => panic!("Expected sequence"),
    }

    match statement("sequence [a where true] until [c where true]").query {
        Query::Sequence(sequence) => {
            assert_eq!(sequence.terms.len(), 1);
            let until = sequence.until.expect("Expected until");
            assert_eq!(until.filter.category, EventCategory::Named("c".to_string()));
        }
        _ => panic!("Expected sequence"),
    }
}

#[test]
fn test_sequence_by_then_maxspan() {
    let s = statement(
        "sequence by user.name with maxspan=30s [process where true] by pid [file where true] by ppid",
    );
    match s.query {
        Query::Sequence(sequence) => {
            let keys = sequence.join_keys.expect("Expected join keys");
            assert_eq!(field(&keys[0]), "user.name");
            assert!(sequence.disallowed_keys.is_none());
            let span = sequence.max_span.expect("Expected maxspan");
            assert_eq!(span.amount, Literal::Integer(30));
            assert_eq!(span.unit, Some(TimeUnit::Seconds));
            assert_eq!(sequence.terms.len(), 2);
            assert_eq!(
                sequence.terms[1].keys.as_ref().map(|k| field(&k[0])),
                Some("ppid".to_string())
            );
        }
        _ => panic!("Expected sequence"),
    }
}

#[test]
fn test_sequence_maxspan_then_disallowed_keys() {
    match statement("sequence with maxspan=5m by host [a where true]").query {
        Query::Sequence(sequence) => {
            assert!(sequence.join_keys.is_none());
            let disallowed = sequence.disallowed_keys.expect("Expected disallowed keys");
            assert_eq!(field(&disallowed[0]), "host");
            assert_eq!(
                sequence.max_span.and_then(|s| s.unit),
                Some(TimeUnit::Minutes)
            );
        }
        _ => panic!("Expected sequence"),
    }
}

#[test]
fn test_sequence_maxspan_without_unit() {
    match statement("sequence with maxspan=1.5 [a where true]").query {
        Query::Sequence(sequence) => {
            let span = sequence.max_span.expect("Expected maxspan");
            assert_eq!(span.amount, Literal::Decimal(Decimal::new(15, 1)));
            assert_eq!(span.unit, None);
        }
        _ => panic!("Expected sequence"),
    }
}

#[test]
fn test_unknown_time_unit() {
    match parse_statement("sequence with maxspan=5w [a where true]").unwrap_err() {
        ParseError::Invalid { message, position } => {
            assert!(message.starts_with("Unrecognized time unit [w]"), "{}", message);
            assert_eq!(position.column, 24);
        }
        other => panic!("Expected invalid time unit, got {:?}", other),
    }
}

#[test]
fn test_sequence_term_parameters() {
    match statement("sequence [a where true] with runs=3 [b where true]").query {
        Query::Sequence(sequence) => {
            assert_eq!(sequence.terms[0].runs(), Some(3));
            assert_eq!(sequence.terms[1].runs(), None);
        }
        _ => panic!("Expected sequence"),
    }
}

#[test]
fn test_join() {
    let s = statement("join by pid [process where true] [file where true] by ppid until [x where true]");
    match s.query {
        Query::Join(join) => {
            assert_eq!(join.join_keys.map(|k| k.len()), Some(1));
            assert_eq!(join.terms.len(), 2);
            assert!(join.terms[0].keys.is_none());
            assert!(join.terms[1].keys.is_some());
            assert!(join.until.is_some());
        }
        _ => panic!("Expected join"),
    }
}

#[test]
fn test_join_with_single_term() {
    assert!(matches!(
        statement("join [a where true]").query,
        Query::Join(ref join) if join.terms.len() == 1
    ));
}

#[test]
fn test_pipes() {
    let s = statement("process where true | head 5 | filter a == 1, b | unique");
    assert_eq!(s.pipes.len(), 3);
    assert_eq!(s.pipes[0].kind, "head");
    assert_eq!(integer(&s.pipes[0].args[0]), 5);
    assert_eq!(s.pipes[1].kind, "filter");
    assert_eq!(s.pipes[1].args.len(), 2);
    assert!(s.pipes[2].args.is_empty());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_sequence_without_terms_fails_at_end() {
    match parse_statement("sequence").unwrap_err() {
        ParseError::Syntax(e) => {
            assert_eq!(e.found_kind, TokenKind::Eof);
            assert_eq!(e.position.column, 9);
            assert!(e.expected.contains(&TokenKind::Lb));
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_sequence_by_without_keys_fails_at_end() {
    match parse_statement("sequence by").unwrap_err() {
        ParseError::Syntax(e) => {
            assert_eq!(e.position, Position::new(1, 12, 11));
            assert_eq!(e.found, "<EOF>");
            assert!(e.expected.contains(&TokenKind::Identifier));
            assert!(e.to_string().starts_with("line 1:12: mismatched input <EOF>"));
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_trailing_tokens() {
    match parse_statement("process where true true").unwrap_err() {
        ParseError::Syntax(e) => {
            assert_eq!(e.found, "'true'");
            for kind in [
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Eq,
                TokenKind::Plus,
                TokenKind::Pipe,
                TokenKind::Eof,
            ] {
                assert!(e.expected.contains(&kind), "{:?} missing from {}", kind, e);
            }
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_missing_where() {
    match parse_statement("process pid == 1").unwrap_err() {
        ParseError::Syntax(e) => {
            assert_eq!(e.expected, vec![TokenKind::Where]);
            assert_eq!(e.position.column, 9);
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_unclosed_in_list() {
    match parse_expression("a in (1, 2").unwrap_err() {
        ParseError::Syntax(e) => {
            assert!(e.expected.contains(&TokenKind::Comma));
            assert!(e.expected.contains(&TokenKind::Rp));
            assert!(!e.expected.contains(&TokenKind::Pipe));
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_expected_tokens_after_process_check() {
    match parse_statement("process where x of [a where true] == true").unwrap_err() {
        ParseError::Syntax(e) => {
            assert_eq!(e.position.column, 35);
            assert_eq!(
                e.expected,
                vec![TokenKind::And, TokenKind::Or, TokenKind::Pipe, TokenKind::Eof]
            );
            assert_eq!(
                e.to_string(),
                "line 1:35: mismatched input '==' expecting {'and', 'or', '|', <EOF>}"
            );
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_expected_tokens_after_comparison() {
    // comparisons do not chain
    match parse_expression("a == b == c").unwrap_err() {
        ParseError::Syntax(e) => {
            assert_eq!(e.found_kind, TokenKind::Eq);
            assert!(!e.expected.contains(&TokenKind::Eq));
            assert!(e.expected.contains(&TokenKind::And));
            assert!(e.expected.contains(&TokenKind::Asterisk));
            assert!(e.expected.contains(&TokenKind::In));
            assert!(e.expected.contains(&TokenKind::Eof));
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_expected_tokens_after_sequence_term() {
    match parse_statement("sequence [a where true] where").unwrap_err() {
        ParseError::Syntax(e) => {
            assert_eq!(
                e.expected,
                vec![
                    TokenKind::By,
                    TokenKind::Until,
                    TokenKind::With,
                    TokenKind::Lb,
                    TokenKind::Pipe,
                    TokenKind::Eof,
                ]
            );
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_expected_tokens_at_bad_primary() {
    match parse_expression("a + )").unwrap_err() {
        ParseError::Syntax(e) => {
            assert_eq!(e.found_kind, TokenKind::Rp);
            assert!(e.expected.contains(&TokenKind::Lp));
            assert!(e.expected.contains(&TokenKind::TildeIdentifier));
            assert!(e.expected.contains(&TokenKind::Minus));
            assert!(!e.expected.contains(&TokenKind::Not));
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_lex_errors_are_reported() {
    assert!(matches!(
        parse_statement("process where a == 'x'").unwrap_err(),
        ParseError::Lex(_)
    ));
}

#[test]
fn test_nesting_limit() {
    let parser = EqlParser::with_config(ParserConfig { max_depth: 5 });
    assert!(parser.create_expression("((a))").is_ok());

    match parser.create_expression("((((((a))))))").unwrap_err() {
        ParseError::Invalid { message, .. } => {
            assert!(message.contains("too deeply nested"), "{}", message)
        }
        other => panic!("Expected nesting error, got {:?}", other),
    }
    assert!(matches!(
        parser.create_expression("not not not not not not a"),
        Err(ParseError::Invalid { .. })
    ));
    assert!(matches!(
        parser.create_expression("- - - - - - 1"),
        Err(ParseError::Invalid { .. })
    ));
}

fn parenthesized(depth: usize) -> String {
    format!("{}a{}", "(".repeat(depth), ")".repeat(depth))
}

fn assert_too_deep(result: Result<impl std::fmt::Debug, ParseError>) {
    match result {
        Err(ParseError::Invalid { message, .. }) => {
            assert!(message.contains("too deeply nested"), "{}", message)
        }
        other => panic!("Expected nesting error, got {:?}", other),
    }
}

#[test]
fn test_default_depth_accepts_nesting_up_to_the_limit() {
    let max_depth = ParserConfig::default().max_depth;
    assert_eq!(expr(&parenthesized(max_depth - 1)), expr("a"));
    assert_too_deep(parse_expression(&parenthesized(max_depth)));
    assert_too_deep(parse_expression(&parenthesized(max_depth + 1)));
}

#[test]
fn test_default_depth_in_statements() {
    let max_depth = ParserConfig::default().max_depth;
    let query = format!("process where {} == 1", parenthesized(max_depth - 1));
    assert!(matches!(statement(&query).query, Query::Event(_)));

    let query = format!("process where {} == 1", parenthesized(max_depth + 1));
    assert_too_deep(parse_statement(&query));
}

#[test]
fn test_default_depth_bounds_not_and_unary_chains() {
    let max_depth = ParserConfig::default().max_depth;
    let nots = |n: usize| format!("{}a", "not ".repeat(n));
    assert!(parse_expression(&nots(max_depth - 1)).is_ok());
    assert_too_deep(parse_expression(&nots(max_depth + 1)));

    let signs = |n: usize| format!("{}1", "- ".repeat(n));
    assert!(parse_expression(&signs(max_depth - 1)).is_ok());
    assert_too_deep(parse_expression(&signs(max_depth + 1)));
}

#[test]
fn test_long_or_chain_is_rejected() {
    let terms: Vec<String> = (0..5000).map(|i| format!("pid == {}", i)).collect();
    let query = format!("process where {}", terms.join(" or "));
    assert_too_deep(parse_statement(&query));
}

#[test]
fn test_long_arithmetic_chain_is_rejected() {
    let terms: Vec<String> = (0..5000).map(|i| i.to_string()).collect();
    assert_too_deep(parse_expression(&terms.join(" + ")));
}

#[test]
fn test_chains_within_the_limit_are_left_nested() {
    let terms: Vec<String> = (0..150).map(|i| format!("pid == {}", i)).collect();
    let mut e = expr(&terms.join(" or "));

    let mut height = 1;
    while let ExprKind::LogicalBinary { op, left, right } = e.kind {
        assert_eq!(op, LogicalOp::Or);
        assert!(matches!(right.kind, ExprKind::Comparison { .. }));
        e = *left;
        height += 1;
    }
    assert_eq!(height, 150);
}

#[test]
fn test_configured_depth_raises_the_chain_limit() {
    let terms: Vec<String> = (0..300).map(|i| format!("a{}", i)).collect();
    let query = terms.join(" and ");
    assert_too_deep(parse_expression(&query));

    let parser = EqlParser::with_config(ParserConfig { max_depth: 400 });
    assert!(parser.create_expression(&query).is_ok());
}

#[test]
fn test_error_position_helper() {
    let err = parse_statement("process where\n  a ==").unwrap_err();
    assert_eq!(err.position().line, 2);
}

// ============================================================================
// Parse tree
// ============================================================================

#[test]
fn test_parse_tree_keeps_default_wrappers() {
    let tokens = tokenize("a and b").unwrap();
    let tree = Parser::new(&tokens, &ParserConfig::default())
        .parse_single_expression()
        .unwrap();

    match *tree.expression.boolean {
        BooleanExpressionNode::LogicalBinary {
            left,
            operator,
            span,
            ..
        } => {
            assert_eq!(operator.kind, TokenKind::And);
            assert_eq!((span.start.offset, span.end), (0, 7));
            match *left {
                BooleanExpressionNode::BooleanDefault(value) => {
                    assert!(matches!(*value, ValueExpressionNode::Default(_)))
                }
                other => panic!("Expected boolean default, got {:?}", other),
            }
        }
        _ => panic!("Expected logical binary"),
    }
}

#[test]
fn test_parse_tree_sequence_roles() {
    let tokens = tokenize("sequence with maxspan=1h by host [a where true]").unwrap();
    let tree = Parser::new(&tokens, &ParserConfig::default())
        .parse_single_statement()
        .unwrap();

    match tree.statement.query {
        QueryNode::Sequence(sequence) => {
            assert!(sequence.by.is_none());
            assert!(sequence.disallowed.is_some());
            let params = sequence.params.expect("Expected params");
            assert_eq!(
                params.time_unit.unit.map(|t| t.text),
                Some("h".to_string())
            );
            assert_eq!(sequence.terms.len(), 1);
        }
        _ => panic!("Expected sequence"),
    }
    assert_eq!(tree.eof.kind, TokenKind::Eof);
}

#[test]
fn test_parse_tree_predicate_forms() {
    let tokens = tokenize("a not in (1) and b like \"x\" and c like (\"y\")").unwrap();
    let tree = Parser::new(&tokens, &ParserConfig::default())
        .parse_single_expression()
        .unwrap();
    let mut forms = Vec::new();
    collect_predicates(&tree.expression.boolean, &mut forms);

    assert!(matches!(forms[0], PredicateForm::Expressions(_)));
    assert!(matches!(forms[1], PredicateForm::Constant(_)));
    assert!(matches!(forms[2], PredicateForm::Constants(_)));
}

fn collect_predicates(node: &BooleanExpressionNode, out: &mut Vec<PredicateForm>) {
    use eql_front::parse_tree::OperatorExpressionNode;
    match node {
        BooleanExpressionNode::LogicalBinary { left, right, .. } => {
            collect_predicates(left, out);
            collect_predicates(right, out);
        }
        BooleanExpressionNode::BooleanDefault(value) => {
            if let ValueExpressionNode::Default(operator) = &**value {
                if let OperatorExpressionNode::Default {
                    predicate: Some(predicate),
                    ..
                } = &**operator
                {
                    out.push(predicate.form.clone());
                }
            }
        }
        _ => {}
    }
}

// ============================================================================
// Sources
// ============================================================================

#[test]
fn test_sources_point_into_the_query() {
    let s = statement("process where a == 1 | head 5");
    match &s.query {
        Query::Event(event) => {
            let condition = &event.filter.condition;
            assert_eq!(condition.source.text(), "a == 1");
            assert_eq!(condition.source.position, Position::new(1, 15, 14));
        }
        _ => panic!("Expected event query"),
    }
    assert_eq!(s.pipes[0].source.text(), "| head 5");
}

#[test]
fn test_equality_ignores_formatting() {
    assert_eq!(
        statement("process where a==1|head 5"),
        statement("process   where /* c */ (a == 1)\n| head 5")
    );
}
