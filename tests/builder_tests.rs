// tests/builder_tests.rs

use std::sync::Arc;

use eql_front::ast::{
    EventCategory, ExprKind, Literal, Position, Query, Source, Token, TokenKind,
};
use eql_front::builder::AstBuilder;
use eql_front::config::ParserConfig;
use eql_front::lexer::tokenize;
use eql_front::parse_tree::{
    BooleanExpressionNode, OperatorExpressionNode, QueryNode, SingleExpressionNode,
    SingleStatementNode, ValueExpressionNode,
};
use eql_front::parser::Parser;

fn statement_tree(input: &str) -> SingleStatementNode {
    let tokens = tokenize(input).unwrap();
    Parser::new(&tokens, &ParserConfig::default())
        .parse_single_statement()
        .unwrap()
}

fn expression_tree(input: &str) -> SingleExpressionNode {
    let tokens = tokenize(input).unwrap();
    Parser::new(&tokens, &ParserConfig::default())
        .parse_single_expression()
        .unwrap()
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_default_wrappers_are_unwrapped() {
    let input = "pid";
    let expr = AstBuilder::new(input)
        .build_expression(&expression_tree(input))
        .unwrap();
    assert!(matches!(expr.kind, ExprKind::QualifiedName(_)));
}

#[test]
fn test_parentheses_are_dropped() {
    let input = "((pid))";
    let expr = AstBuilder::new(input)
        .build_expression(&expression_tree(input))
        .unwrap();
    assert!(matches!(expr.kind, ExprKind::QualifiedName(_)));
}

#[test]
fn test_strings_and_identifiers_are_unescaped() {
    let input = r#"`odd``name` == "tab\there""#;
    let expr = AstBuilder::new(input)
        .build_expression(&expression_tree(input))
        .unwrap();
    match expr.kind {
        ExprKind::Comparison { left, right, .. } => {
            assert_eq!(
                left.as_name().map(|n| n.path().join(".")),
                Some("odd`name".to_string())
            );
            assert_eq!(
                right.as_literal(),
                Some(&Literal::String("tab\there".to_string()))
            );
        }
        _ => panic!("Expected comparison"),
    }
}

#[test]
fn test_string_event_category() {
    let input = r#""process" where true"#;
    let statement = AstBuilder::new(input)
        .build_statement(&statement_tree(input))
        .unwrap();
    match statement.query {
        Query::Event(event) => assert_eq!(
            event.filter.category,
            EventCategory::Named("process".to_string())
        ),
        _ => panic!("Expected event query"),
    }
}

#[test]
fn test_every_node_gets_a_source() {
    let input = "sequence by pid\n  [process where a + 1 > 2]";
    let statement = AstBuilder::new(input)
        .build_statement(&statement_tree(input))
        .unwrap();
    match statement.query {
        Query::Sequence(sequence) => {
            assert_eq!(sequence.source.text(), input);
            let term = &sequence.terms[0];
            assert_eq!(term.source.text(), "[process where a + 1 > 2]");
            assert_eq!(term.source.position.line, 2);
            assert_eq!(term.filter.source.text(), "process where a + 1 > 2");
            match &term.filter.condition.kind {
                ExprKind::Comparison { left, right, .. } => {
                    assert_eq!(left.source.text(), "a + 1");
                    assert_eq!(right.source.text(), "2");
                }
                _ => panic!("Expected comparison"),
            }
        }
        _ => panic!("Expected sequence"),
    }
}

#[test]
fn test_source_slices() {
    let query: Arc<str> = Arc::from("process where true");
    let source = Source::slice(&query, Position::new(1, 9, 8), 13);
    assert_eq!(source.text(), "where");
    assert_eq!(source.position.column, 9);

    // out of range or not on a char boundary
    assert_eq!(Source::slice(&query, Position::new(1, 9, 8), 99).text(), "");
    let accented: Arc<str> = Arc::from("é");
    assert_eq!(Source::slice(&accented, Position::start(), 1).text(), "");

    assert_eq!(Source::new(Position::start(), "a == 1").text(), "a == 1");
    assert_eq!(Source::synthetic().text(), "");
}

// ============================================================================
// Hand-built trees
// ============================================================================

#[test]
fn test_sequence_without_terms_is_rejected() {
    let input = "sequence [a where true]";
    let mut tree = statement_tree(input);
    match &mut tree.statement.query {
        QueryNode::Sequence(sequence) => sequence.terms.clear(),
        _ => panic!("Expected sequence"),
    }

    let err = AstBuilder::new(input).build_statement(&tree).unwrap_err();
    assert_eq!(err.message, "sequence requires at least one term");
}

#[test]
fn test_join_without_terms_is_rejected() {
    let input = "join [a where true]";
    let mut tree = statement_tree(input);
    match &mut tree.statement.query {
        QueryNode::Join(join) => join.terms.clear(),
        _ => panic!("Expected join"),
    }

    assert!(AstBuilder::new(input).build_statement(&tree).is_err());
}

#[test]
fn test_unknown_time_unit_is_rejected() {
    let input = "sequence with maxspan=5m [a where true]";
    let mut tree = statement_tree(input);
    match &mut tree.statement.query {
        QueryNode::Sequence(sequence) => {
            let params = sequence.params.as_mut().expect("Expected params");
            if let Some(unit) = params.time_unit.unit.as_mut() {
                unit.text = "fortnights".to_string();
            }
        }
        _ => panic!("Expected sequence"),
    }

    let err = AstBuilder::new(input).build_statement(&tree).unwrap_err();
    assert!(err.message.contains("fortnights"), "{}", err.message);
}

#[test]
fn test_negated_pattern_is_rejected() {
    let input = "a like \"x\"";
    let mut tree = expression_tree(input);
    let operator = match &mut *tree.expression.boolean {
        BooleanExpressionNode::BooleanDefault(value) => match &mut **value {
            ValueExpressionNode::Default(operator) => operator,
            _ => panic!("Expected value expression"),
        },
        _ => panic!("Expected boolean default"),
    };
    match &mut **operator {
        OperatorExpressionNode::Default {
            predicate: Some(predicate),
            ..
        } => {
            predicate.not = Some(Token::new(
                TokenKind::Not,
                "not",
                predicate.kind.position,
            ));
        }
        _ => panic!("Expected predicate"),
    }

    let err = AstBuilder::new(input).build_expression(&tree).unwrap_err();
    assert!(err.message.contains("[like]"), "{}", err.message);
}

#[test]
fn test_wrong_operator_token_is_rejected() {
    let input = "a and b";
    let mut tree = expression_tree(input);
    match &mut *tree.expression.boolean {
        BooleanExpressionNode::LogicalBinary { operator, .. } => {
            operator.kind = TokenKind::Plus;
        }
        _ => panic!("Expected logical binary"),
    }

    assert!(AstBuilder::new(input).build_expression(&tree).is_err());
}
