use serde::Serialize;

use crate::ast::TokenKind;

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogicalOp {
    /// `and`
    And,
    /// `or`
    Or,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComparisonOp {
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArithmeticOp {
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
}

/// Unary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Negate,
}

/// Membership and pattern predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PredicateKind {
    /// `in (...)`
    In,
    /// `in~ (...)`
    InInsensitive,
    /// `like`
    Like,
    /// `like~`
    LikeInsensitive,
    /// `regex`
    Regex,
    /// `regex~`
    RegexInsensitive,
    /// `:`, case-insensitive equality
    Seq,
}

impl LogicalOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }
}

impl ComparisonOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Eq => ComparisonOp::Equal,
            TokenKind::Neq => ComparisonOp::NotEqual,
            TokenKind::Lt => ComparisonOp::LessThan,
            TokenKind::Lte => ComparisonOp::LessEqual,
            TokenKind::Gt => ComparisonOp::GreaterThan,
            TokenKind::Gte => ComparisonOp::GreaterEqual,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => "==",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterEqual => ">=",
        }
    }
}

impl ArithmeticOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Asterisk => ArithmeticOp::Multiply,
            TokenKind::Slash => ArithmeticOp::Divide,
            TokenKind::Percent => ArithmeticOp::Modulo,
            TokenKind::Plus => ArithmeticOp::Add,
            TokenKind::Minus => ArithmeticOp::Subtract,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Modulo => "%",
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
        }
    }

    /// `* / %` bind tighter than `+ -`.
    pub fn precedence(&self) -> u8 {
        match self {
            ArithmeticOp::Multiply | ArithmeticOp::Divide | ArithmeticOp::Modulo => 2,
            ArithmeticOp::Add | ArithmeticOp::Subtract => 1,
        }
    }
}

impl UnaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Negate),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Negate => "-",
        }
    }
}

impl PredicateKind {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let predicate = match kind {
            TokenKind::In => PredicateKind::In,
            TokenKind::InInsensitive => PredicateKind::InInsensitive,
            TokenKind::Like => PredicateKind::Like,
            TokenKind::LikeInsensitive => PredicateKind::LikeInsensitive,
            TokenKind::Regex => PredicateKind::Regex,
            TokenKind::RegexInsensitive => PredicateKind::RegexInsensitive,
            TokenKind::Seq => PredicateKind::Seq,
            _ => return None,
        };
        Some(predicate)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            PredicateKind::In => "in",
            PredicateKind::InInsensitive => "in~",
            PredicateKind::Like => "like",
            PredicateKind::LikeInsensitive => "like~",
            PredicateKind::Regex => "regex",
            PredicateKind::RegexInsensitive => "regex~",
            PredicateKind::Seq => ":",
        }
    }

    /// `in` and `in~` take arbitrary expressions and may be negated; the
    /// pattern forms only take constants.
    pub fn is_membership(&self) -> bool {
        matches!(self, PredicateKind::In | PredicateKind::InInsensitive)
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            PredicateKind::InInsensitive
                | PredicateKind::LikeInsensitive
                | PredicateKind::RegexInsensitive
                | PredicateKind::Seq
        )
    }
}
