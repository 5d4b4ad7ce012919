use rust_decimal::Decimal;
use serde::Serialize;

use crate::ast::{
    ArithmeticOp, ComparisonOp, EventFilter, LogicalOp, PredicateKind, Source, UnaryOp,
};

/// Expression node.
///
/// Equality is structural: `source` is carried for error reporting and is
/// ignored by `==`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Expr {
    pub source: Source,
    pub kind: ExprKind,
}

/// The shape of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ExprKind {
    /// `not <operand>`
    LogicalNot(Box<Expr>),

    /// `<left> and <right>`, `<left> or <right>`
    LogicalBinary {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Ancestry check against another event
    ///
    /// # Example
    /// ```text
    /// descendant of [process where process_name == "explorer.exe"]
    /// ```
    ProcessCheck {
        relationship: String,
        subquery: Box<EventFilter>,
    },

    /// `<left> == <right>` and the other comparison operators
    Comparison {
        op: ComparisonOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    ArithmeticBinary {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    ArithmeticUnary { op: UnaryOp, operand: Box<Expr> },

    /// Membership or pattern test
    ///
    /// `list` holds the expressions of an `in` list, or the constants a
    /// pattern predicate matches against (one for `like "x"`).
    ///
    /// # Examples
    /// ```text
    /// pid in (1, 2, 3)
    /// pid not in (1, 2, 3)
    /// name like~ ("*.exe", "*.dll")
    /// name : "cmd.exe"
    /// ```
    Predicate {
        kind: PredicateKind,
        negated: bool,
        value: Box<Expr>,
        list: Vec<Expr>,
    },

    /// Function call; `case_insensitive` is set for the `name~(...)` form
    FunctionCall {
        name: String,
        case_insensitive: bool,
        args: Vec<Expr>,
    },

    /// Field reference
    QualifiedName(QualifiedName),

    Literal(Literal),
}

/// Dotted field path, e.g. `process.args[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QualifiedName {
    pub segments: Vec<NameSegment>,
}

/// One dotted component of a name with the `[i]` accessors written right
/// after it, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NameSegment {
    pub name: String,
    pub indices: Vec<i64>,
}

impl QualifiedName {
    /// Names of the dotted components.
    pub fn path(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.name.as_str()).collect()
    }

    /// All index accessors, left to right.
    pub fn indices(&self) -> Vec<i64> {
        self.segments
            .iter()
            .flat_map(|s| s.indices.iter().copied())
            .collect()
    }
}

/// Constant values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Literal {
    Null,
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    String(String),
}

impl Expr {
    pub fn new(source: Source, kind: ExprKind) -> Self {
        Expr { source, kind }
    }

    /// Builds an expression without source information.
    pub fn synthetic(kind: ExprKind) -> Self {
        Expr::new(Source::synthetic(), kind)
    }

    pub fn literal(literal: Literal) -> Self {
        Expr::synthetic(ExprKind::Literal(literal))
    }

    /// Single-segment field reference.
    pub fn field(name: impl Into<String>) -> Self {
        Expr::synthetic(ExprKind::QualifiedName(QualifiedName {
            segments: vec![NameSegment {
                name: name.into(),
                indices: Vec::new(),
            }],
        }))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&QualifiedName> {
        match &self.kind {
            ExprKind::QualifiedName(name) => Some(name),
            _ => None,
        }
    }
}
