//! EQL output for AST nodes.
//!
//! Printing a parsed statement and parsing the result again yields an equal
//! statement. Only the parentheses needed to keep the tree shape are written,
//! so redundant ones in the original query disappear.
//!
//! # Features
//!
//! - **Compact output** via [`to_eql()`] - the whole statement on one line
//! - **Pretty output** via [`to_eql_pretty()`] - one sequence/join term and one pipe per line
//! - **Expressions** via [`expression_to_eql()`]
//!
//! # Examples
//!
//! ```
//! use eql_front::parser::EqlParser;
//! use eql_front::printer::to_eql;
//!
//! let statement = EqlParser::new()
//!     .create_statement("process where ((a or b)) and c  |head 1")
//!     .unwrap();
//! assert_eq!(to_eql(&statement), "process where (a or b) and c | head 1");
//! ```

use std::fmt;

use rust_decimal::Decimal;

use crate::ast::{
    EventCategory, EventFilter, Expr, ExprKind, Join, JoinTerm, Literal, LogicalOp, Pipe, Query,
    QualifiedName, Sequence, SequenceTerm, Statement, TimeValue,
};
use crate::lexer::{is_plain_identifier, quote_identifier, quote_string};

const OR: u8 = 1;
const AND: u8 = 2;
const PREFIX: u8 = 3;
const COMPARISON: u8 = 4;
const UNARY: u8 = 7;
const PREDICATE: u8 = 8;
const PRIMARY: u8 = 9;

pub struct QueryPrinter {
    pretty: bool,
}

impl QueryPrinter {
    pub fn new(pretty: bool) -> Self {
        QueryPrinter { pretty }
    }

    pub fn print(&self, statement: &Statement) -> String {
        let mut result = self.print_query(&statement.query);
        for pipe in &statement.pipes {
            result.push_str(self.separator(0));
            result.push_str(&self.print_pipe(pipe));
        }
        result
    }

    pub fn print_expression(&self, expr: &Expr) -> String {
        self.print_expr(expr, 0)
    }

    /// Space between clauses, or a newline plus indentation in pretty mode.
    fn separator(&self, indent: usize) -> &'static str {
        match (self.pretty, indent) {
            (false, _) => " ",
            (true, 0) => "\n",
            (true, _) => "\n  ",
        }
    }

    fn print_query(&self, query: &Query) -> String {
        match query {
            Query::Sequence(sequence) => self.print_sequence(sequence),
            Query::Join(join) => self.print_join(join),
            Query::Event(event) => self.print_filter(&event.filter),
        }
    }

    fn print_sequence(&self, sequence: &Sequence) -> String {
        let mut result = "sequence".to_string();
        if let Some(keys) = &sequence.join_keys {
            result.push_str(&format!(" by {}", self.print_list(keys)));
        }
        if let Some(span) = &sequence.max_span {
            result.push_str(&format!(" with maxspan={}", self.print_time(span)));
        }
        if let Some(keys) = &sequence.disallowed_keys {
            result.push_str(&format!(" by {}", self.print_list(keys)));
        }
        for term in &sequence.terms {
            result.push_str(self.separator(1));
            result.push_str(&self.print_sequence_term(term));
        }
        if let Some(until) = &sequence.until {
            result.push_str(self.separator(0));
            result.push_str("until ");
            result.push_str(&self.print_sequence_term(until));
        }
        result
    }

    fn print_sequence_term(&self, term: &SequenceTerm) -> String {
        let mut result = format!("[{}]", self.print_filter(&term.filter));
        if let Some(keys) = &term.keys {
            result.push_str(&format!(" by {}", self.print_list(keys)));
        }
        if let Some(parameter) = &term.parameter {
            result.push_str(&format!(
                " with {}={}",
                parameter.key,
                print_literal(&parameter.value)
            ));
        }
        result
    }

    fn print_join(&self, join: &Join) -> String {
        let mut result = "join".to_string();
        if let Some(keys) = &join.join_keys {
            result.push_str(&format!(" by {}", self.print_list(keys)));
        }
        for term in &join.terms {
            result.push_str(self.separator(1));
            result.push_str(&self.print_join_term(term));
        }
        if let Some(until) = &join.until {
            result.push_str(self.separator(0));
            result.push_str("until ");
            result.push_str(&self.print_join_term(until));
        }
        result
    }

    fn print_join_term(&self, term: &JoinTerm) -> String {
        let mut result = format!("[{}]", self.print_filter(&term.filter));
        if let Some(keys) = &term.keys {
            result.push_str(&format!(" by {}", self.print_list(keys)));
        }
        result
    }

    fn print_filter(&self, filter: &EventFilter) -> String {
        let category = match &filter.category {
            EventCategory::Any => "any".to_string(),
            EventCategory::Named(name) if is_plain_identifier(name) => name.clone(),
            EventCategory::Named(name) => quote_string(name),
        };
        format!("{} where {}", category, self.print_expr(&filter.condition, 0))
    }

    fn print_time(&self, span: &TimeValue) -> String {
        let unit = span.unit.map(|u| u.suffix()).unwrap_or("");
        format!("{}{}", print_literal(&span.amount), unit)
    }

    fn print_pipe(&self, pipe: &Pipe) -> String {
        if pipe.args.is_empty() {
            format!("| {}", pipe.kind)
        } else {
            format!("| {} {}", pipe.kind, self.print_list(&pipe.args))
        }
    }

    fn print_list(&self, exprs: &[Expr]) -> String {
        let items: Vec<String> = exprs.iter().map(|e| self.print_expr(e, 0)).collect();
        items.join(", ")
    }

    /// Prints `expr`, parenthesized when it binds looser than `min_level`.
    fn print_expr(&self, expr: &Expr, min_level: u8) -> String {
        let text = match &expr.kind {
            ExprKind::LogicalNot(operand) => format!("not {}", self.print_expr(operand, PREFIX)),
            ExprKind::LogicalBinary { op, left, right } => {
                let level = level(expr);
                format!(
                    "{} {} {}",
                    self.print_expr(left, level),
                    op.symbol(),
                    self.print_expr(right, level + 1)
                )
            }
            ExprKind::ProcessCheck {
                relationship,
                subquery,
            } => format!("{} of [{}]", relationship, self.print_filter(subquery)),
            ExprKind::Comparison { op, left, right } => format!(
                "{} {} {}",
                self.print_expr(left, COMPARISON + 1),
                op.symbol(),
                self.print_expr(right, COMPARISON + 1)
            ),
            ExprKind::ArithmeticBinary { op, left, right } => {
                let level = level(expr);
                format!(
                    "{} {} {}",
                    self.print_expr(left, level),
                    op.symbol(),
                    self.print_expr(right, level + 1)
                )
            }
            ExprKind::ArithmeticUnary { op, operand } => {
                format!("{}{}", op.symbol(), self.print_expr(operand, UNARY))
            }
            ExprKind::Predicate {
                kind,
                negated,
                value,
                list,
            } => {
                let value = self.print_expr(value, PRIMARY);
                let not = if *negated { "not " } else { "" };
                match list.as_slice() {
                    [single] if !kind.is_membership() => {
                        format!("{} {}{} {}", value, not, kind.symbol(), self.print_expr(single, 0))
                    }
                    _ => format!("{} {}{} ({})", value, not, kind.symbol(), self.print_list(list)),
                }
            }
            ExprKind::FunctionCall {
                name,
                case_insensitive,
                args,
            } => {
                let tilde = if *case_insensitive { "~" } else { "" };
                format!("{}{}({})", name, tilde, self.print_list(args))
            }
            ExprKind::QualifiedName(name) => print_name(name),
            ExprKind::Literal(literal) => print_literal(literal),
        };

        if level(expr) < min_level {
            format!("({})", text)
        } else {
            text
        }
    }
}

fn level(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::LogicalBinary {
            op: LogicalOp::Or, ..
        } => OR,
        ExprKind::LogicalBinary {
            op: LogicalOp::And,
            ..
        } => AND,
        ExprKind::LogicalNot(_) | ExprKind::ProcessCheck { .. } => PREFIX,
        ExprKind::Comparison { .. } => COMPARISON,
        ExprKind::ArithmeticBinary { op, .. } => COMPARISON + op.precedence(),
        ExprKind::ArithmeticUnary { .. } => UNARY,
        ExprKind::Predicate { .. } => PREDICATE,
        ExprKind::FunctionCall { .. } | ExprKind::QualifiedName(_) | ExprKind::Literal(_) => {
            PRIMARY
        }
    }
}

fn print_name(name: &QualifiedName) -> String {
    let segments: Vec<String> = name
        .segments
        .iter()
        .map(|segment| {
            let mut text = quote_identifier(&segment.name);
            for index in &segment.indices {
                text.push_str(&format!("[{}]", index));
            }
            text
        })
        .collect();
    segments.join(".")
}

fn print_literal(literal: &Literal) -> String {
    match literal {
        Literal::Null => "null".to_string(),
        Literal::Integer(n) => n.to_string(),
        Literal::Decimal(d) => print_decimal(d),
        Literal::Boolean(b) => b.to_string(),
        Literal::String(s) => quote_string(s),
    }
}

/// Decimals keep a fraction so they read back as decimals.
fn print_decimal(value: &Decimal) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

// Convenience functions

/// Renders a statement on a single line.
pub fn to_eql(statement: &Statement) -> String {
    QueryPrinter::new(false).print(statement)
}

/// Renders a statement with each sequence or join term and each pipe on its
/// own line.
///
/// # Examples
///
/// ```
/// use eql_front::parser::EqlParser;
/// use eql_front::printer::to_eql_pretty;
///
/// let statement = EqlParser::new()
///     .create_statement("sequence [a where true] [b where false] | tail 3")
///     .unwrap();
/// assert_eq!(
///     to_eql_pretty(&statement),
///     "sequence\n  [a where true]\n  [b where false]\n| tail 3"
/// );
/// ```
pub fn to_eql_pretty(statement: &Statement) -> String {
    QueryPrinter::new(true).print(statement)
}

pub fn expression_to_eql(expr: &Expr) -> String {
    QueryPrinter::new(false).print_expression(expr)
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_eql(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&expression_to_eql(self))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_literal(self))
    }
}
