//! Parse tree to AST conversion.
//!
//! The builder drops punctuation, unescapes strings and quoted identifiers,
//! folds index accessors into the name they follow, and tags every node with
//! its [`Source`]. Wrapper alternatives that add nothing of their own
//! (`booleanDefault`, `valueExpressionDefault`, parenthesized expressions)
//! collapse into their child.

use std::sync::Arc;

use crate::ast::{
    ArithmeticOp, ComparisonOp, EventCategory, EventFilter, EventQuery, Expr, ExprKind, Join,
    JoinTerm, Literal, LogicalOp, NameSegment, Pipe, PredicateKind, QualifiedName, Query,
    Sequence, SequenceTerm, Source, Statement, TermParameter, TimeUnit, TimeValue, Token,
    TokenKind, UnaryOp,
};
use crate::error::BuildError;
use crate::lexer::{unquote_identifier, unquote_string};
use crate::parse_tree::*;

type Result<T> = std::result::Result<T, BuildError>;

/// Builds AST nodes out of parse trees of `input`.
pub struct AstBuilder {
    query: Arc<str>,
}

impl AstBuilder {
    /// `input` is the text the parse trees were produced from. It is copied
    /// once and shared by the sources of every node built.
    pub fn new(input: &str) -> Self {
        AstBuilder {
            query: Arc::from(input),
        }
    }

    pub fn build_statement(&self, tree: &SingleStatementNode) -> Result<Statement> {
        self.statement(&tree.statement)
    }

    pub fn build_expression(&self, tree: &SingleExpressionNode) -> Result<Expr> {
        self.expression(&tree.expression)
    }

    fn source(&self, span: Span) -> Source {
        Source::slice(&self.query, span.start, span.end)
    }

    // ========================================================================
    // Statements and queries
    // ========================================================================

    pub fn statement(&self, node: &StatementNode) -> Result<Statement> {
        let query = self.query(&node.query)?;
        let pipes = node
            .pipes
            .iter()
            .map(|pipe| self.pipe(pipe))
            .collect::<Result<Vec<_>>>()?;
        Ok(Statement { query, pipes })
    }

    pub fn query(&self, node: &QueryNode) -> Result<Query> {
        match node {
            QueryNode::Sequence(sequence) => Ok(Query::Sequence(self.sequence(sequence)?)),
            QueryNode::Join(join) => Ok(Query::Join(self.join(join)?)),
            QueryNode::Event(event) => Ok(Query::Event(self.event_query(event)?)),
        }
    }

    pub fn sequence(&self, node: &SequenceNode) -> Result<Sequence> {
        if node.terms.is_empty() {
            return Err(BuildError::new(
                node.span.start,
                "sequence requires at least one term",
            ));
        }
        let join_keys = node.by.as_ref().map(|k| self.join_keys(k)).transpose()?;
        let disallowed_keys = node
            .disallowed
            .as_ref()
            .map(|k| self.join_keys(k))
            .transpose()?;
        let max_span = node
            .params
            .as_ref()
            .map(|p| self.time_unit(&p.time_unit))
            .transpose()?;
        let terms = node
            .terms
            .iter()
            .map(|term| self.sequence_term(term))
            .collect::<Result<Vec<_>>>()?;
        let until = node
            .until
            .as_ref()
            .map(|u| self.sequence_term(&u.term))
            .transpose()?;

        Ok(Sequence {
            source: self.source(node.span),
            join_keys,
            disallowed_keys,
            max_span,
            terms,
            until,
        })
    }

    pub fn join(&self, node: &JoinNode) -> Result<Join> {
        if node.terms.is_empty() {
            return Err(BuildError::new(
                node.span.start,
                "join requires at least one term",
            ));
        }
        let join_keys = node.by.as_ref().map(|k| self.join_keys(k)).transpose()?;
        let terms = node
            .terms
            .iter()
            .map(|term| self.join_term(term))
            .collect::<Result<Vec<_>>>()?;
        let until = node
            .until
            .as_ref()
            .map(|u| self.join_term(&u.term))
            .transpose()?;

        Ok(Join {
            source: self.source(node.span),
            join_keys,
            terms,
            until,
        })
    }

    pub fn pipe(&self, node: &PipeNode) -> Result<Pipe> {
        let args = node
            .args
            .iter()
            .map(|arg| self.boolean_expression(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(Pipe {
            source: self.source(node.span),
            kind: node.kind.text.clone(),
            args,
        })
    }

    pub fn join_keys(&self, node: &JoinKeysNode) -> Result<Vec<Expr>> {
        node.keys.iter().map(|key| self.expression(key)).collect()
    }

    pub fn join_term(&self, node: &JoinTermNode) -> Result<JoinTerm> {
        Ok(JoinTerm {
            source: self.source(node.span),
            filter: self.subquery(&node.subquery)?,
            keys: node.by.as_ref().map(|k| self.join_keys(k)).transpose()?,
        })
    }

    pub fn sequence_term(&self, node: &SequenceTermNode) -> Result<SequenceTerm> {
        let parameter = node.parameter.as_ref().map(|p| TermParameter {
            key: p.key.text.clone(),
            value: self.number(&p.value),
        });

        Ok(SequenceTerm {
            source: self.source(node.span),
            filter: self.subquery(&node.subquery)?,
            keys: node.by.as_ref().map(|k| self.join_keys(k)).transpose()?,
            parameter,
        })
    }

    pub fn subquery(&self, node: &SubqueryNode) -> Result<EventFilter> {
        self.event_filter(&node.filter)
    }

    pub fn event_query(&self, node: &EventQueryNode) -> Result<EventQuery> {
        Ok(EventQuery {
            source: self.source(node.filter.span),
            filter: self.event_filter(&node.filter)?,
        })
    }

    pub fn event_filter(&self, node: &EventFilterNode) -> Result<EventFilter> {
        let category = match &node.event {
            EventValueNode::Any(_) => EventCategory::Any,
            EventValueNode::Value(token) => match token.kind {
                TokenKind::String => EventCategory::Named(unquote_string(&token.text)),
                TokenKind::Identifier => EventCategory::Named(token.text.clone()),
                _ => return Err(unexpected_token(token, "event category")),
            },
        };
        Ok(EventFilter {
            source: self.source(node.span),
            category,
            condition: self.expression(&node.condition)?,
        })
    }

    /// `maxspan` value; the parser has already rejected unknown units.
    pub fn time_unit(&self, node: &TimeUnitNode) -> Result<TimeValue> {
        let unit = match &node.unit {
            Some(token) => Some(TimeUnit::parse(&token.text).ok_or_else(|| {
                BuildError::new(
                    token.position,
                    format!("unknown time unit [{}]", token.text),
                )
            })?),
            None => None,
        };
        Ok(TimeValue {
            amount: self.number(&node.number),
            unit,
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn expression(&self, node: &ExpressionNode) -> Result<Expr> {
        self.boolean_expression(&node.boolean)
    }

    pub fn boolean_expression(&self, node: &BooleanExpressionNode) -> Result<Expr> {
        match node {
            BooleanExpressionNode::LogicalNot { span, operand, .. } => Ok(Expr::new(
                self.source(*span),
                ExprKind::LogicalNot(Box::new(self.boolean_expression(operand)?)),
            )),
            BooleanExpressionNode::ProcessCheck {
                span,
                relationship,
                subquery,
                ..
            } => Ok(Expr::new(
                self.source(*span),
                ExprKind::ProcessCheck {
                    relationship: relationship.text.clone(),
                    subquery: Box::new(self.subquery(subquery)?),
                },
            )),
            BooleanExpressionNode::BooleanDefault(value) => self.value_expression(value),
            BooleanExpressionNode::LogicalBinary {
                span,
                left,
                operator,
                right,
            } => {
                let op = match operator.kind {
                    TokenKind::And => LogicalOp::And,
                    TokenKind::Or => LogicalOp::Or,
                    _ => return Err(unexpected_token(operator, "logical operator")),
                };
                Ok(Expr::new(
                    self.source(*span),
                    ExprKind::LogicalBinary {
                        op,
                        left: Box::new(self.boolean_expression(left)?),
                        right: Box::new(self.boolean_expression(right)?),
                    },
                ))
            }
        }
    }

    pub fn value_expression(&self, node: &ValueExpressionNode) -> Result<Expr> {
        match node {
            ValueExpressionNode::Default(operator) => self.operator_expression(operator),
            ValueExpressionNode::Comparison {
                span,
                left,
                operator,
                right,
            } => {
                let op = ComparisonOp::from_token(operator.token.kind)
                    .ok_or_else(|| unexpected_token(&operator.token, "comparison operator"))?;
                Ok(Expr::new(
                    self.source(*span),
                    ExprKind::Comparison {
                        op,
                        left: Box::new(self.operator_expression(left)?),
                        right: Box::new(self.operator_expression(right)?),
                    },
                ))
            }
        }
    }

    pub fn operator_expression(&self, node: &OperatorExpressionNode) -> Result<Expr> {
        match node {
            OperatorExpressionNode::Default {
                span,
                primary,
                predicate,
            } => {
                let value = self.primary_expression(primary)?;
                match predicate {
                    Some(predicate) => self.predicate(*span, value, predicate),
                    None => Ok(value),
                }
            }
            OperatorExpressionNode::ArithmeticUnary {
                span,
                operator,
                operand,
            } => {
                let op = UnaryOp::from_token(operator.kind)
                    .ok_or_else(|| unexpected_token(operator, "unary operator"))?;
                Ok(Expr::new(
                    self.source(*span),
                    ExprKind::ArithmeticUnary {
                        op,
                        operand: Box::new(self.operator_expression(operand)?),
                    },
                ))
            }
            OperatorExpressionNode::ArithmeticBinary {
                span,
                left,
                operator,
                right,
            } => {
                let op = ArithmeticOp::from_token(operator.kind)
                    .ok_or_else(|| unexpected_token(operator, "arithmetic operator"))?;
                Ok(Expr::new(
                    self.source(*span),
                    ExprKind::ArithmeticBinary {
                        op,
                        left: Box::new(self.operator_expression(left)?),
                        right: Box::new(self.operator_expression(right)?),
                    },
                ))
            }
        }
    }

    /// Wraps `value` in the predicate applied to it.
    pub fn predicate(&self, span: Span, value: Expr, node: &PredicateNode) -> Result<Expr> {
        let kind = PredicateKind::from_token(node.kind.kind)
            .ok_or_else(|| unexpected_token(&node.kind, "predicate"))?;
        if node.not.is_some() && !kind.is_membership() {
            return Err(BuildError::new(
                node.kind.position,
                format!("[not] cannot be applied to [{}]", kind.symbol()),
            ));
        }

        let list = match &node.form {
            PredicateForm::Expressions(expressions) if kind.is_membership() => expressions
                .iter()
                .map(|e| self.expression(e))
                .collect::<Result<Vec<_>>>()?,
            PredicateForm::Constant(constant) if !kind.is_membership() => {
                vec![self.constant(constant)]
            }
            PredicateForm::Constants(constants) if !kind.is_membership() => {
                constants.iter().map(|c| self.constant(c)).collect()
            }
            _ => {
                return Err(BuildError::new(
                    node.kind.position,
                    format!("invalid operand list for [{}]", kind.symbol()),
                ));
            }
        };

        Ok(Expr::new(
            self.source(span),
            ExprKind::Predicate {
                kind,
                negated: node.not.is_some(),
                value: Box::new(value),
                list,
            },
        ))
    }

    pub fn primary_expression(&self, node: &PrimaryExpressionNode) -> Result<Expr> {
        match node {
            PrimaryExpressionNode::Constant(constant) => Ok(self.constant(constant)),
            PrimaryExpressionNode::Function(function) => self.function_expression(function),
            PrimaryExpressionNode::Dereference(name) => self.qualified_name(name),
            PrimaryExpressionNode::Parenthesized { expression, .. } => self.expression(expression),
        }
    }

    pub fn function_expression(&self, node: &FunctionExpressionNode) -> Result<Expr> {
        let token = &node.name.token;
        let (name, case_insensitive) = match token.kind {
            TokenKind::Identifier => (token.text.clone(), false),
            TokenKind::TildeIdentifier => {
                let name = token.text.strip_suffix('~').unwrap_or(&token.text);
                (name.to_string(), true)
            }
            _ => return Err(unexpected_token(token, "function name")),
        };
        let args = node
            .args
            .iter()
            .map(|arg| self.expression(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(Expr::new(
            self.source(node.span),
            ExprKind::FunctionCall {
                name,
                case_insensitive,
                args,
            },
        ))
    }

    pub fn constant(&self, node: &ConstantNode) -> Expr {
        let literal = match node {
            ConstantNode::Null(_) => Literal::Null,
            ConstantNode::Numeric(number) => self.number(number),
            ConstantNode::Boolean(value) => Literal::Boolean(value.token.is(TokenKind::True)),
            ConstantNode::String(value) => Literal::String(unquote_string(&value.token.text)),
        };
        Expr::new(self.source(node.span()), ExprKind::Literal(literal))
    }

    pub fn number(&self, node: &NumberNode) -> Literal {
        match node {
            NumberNode::Integer { value, .. } => Literal::Integer(*value),
            NumberNode::Decimal { value, .. } => Literal::Decimal(*value),
        }
    }

    pub fn qualified_name(&self, node: &QualifiedNameNode) -> Result<Expr> {
        let mut segments = vec![NameSegment {
            name: self.identifier(&node.first)?,
            indices: Vec::new(),
        }];
        for suffix in &node.suffixes {
            match suffix {
                NameSuffixNode::Field { name, .. } => segments.push(NameSegment {
                    name: self.identifier(name)?,
                    indices: Vec::new(),
                }),
                NameSuffixNode::Index { indices, .. } => {
                    if let Some(last) = segments.last_mut() {
                        for index in indices {
                            match index {
                                NumberNode::Integer { value, .. } => last.indices.push(*value),
                                NumberNode::Decimal { token, .. } => {
                                    return Err(unexpected_token(token, "array index"));
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(Expr::new(
            self.source(node.span),
            ExprKind::QualifiedName(QualifiedName { segments }),
        ))
    }

    pub fn identifier(&self, node: &IdentifierNode) -> Result<String> {
        match node.token.kind {
            TokenKind::Identifier => Ok(node.token.text.clone()),
            TokenKind::QuotedIdentifier => Ok(unquote_identifier(&node.token.text)),
            _ => Err(unexpected_token(&node.token, "identifier")),
        }
    }
}

fn unexpected_token(token: &Token, role: &str) -> BuildError {
    BuildError::new(
        token.position,
        format!("token {} cannot be used as {}", token.kind, role),
    )
}
