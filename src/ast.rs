//! # EQL - Abstract Syntax Tree
//!
//! Typed representation of an EQL statement, produced by
//! [`AstBuilder`](crate::builder::AstBuilder) from a parse tree and consumed
//! by semantic analysis.
//!
//! ## Layout
//!
//! - **[tokens]** - Lexical tokens, positions and node sources
//! - **[expressions]** - Expression nodes (logic, comparison, arithmetic, predicates, names, literals)
//! - **[operators]** - Operator enums
//! - **[query]** - Sequence, join and event queries
//! - **[statements]** - Statements and pipes
//!
//! ## Example
//!
//! ```text
//! sequence by host.id with maxspan=1h
//!   [process where process.name : "cmd.exe"]
//!   [network where destination.port in (80, 443)]
//! | head 5
//! ```
//!
//! parses to a [`Statement`] holding a [`Query::Sequence`] with one join key,
//! a one hour span, two terms and a single `head` pipe.
//!
//! Every node keeps the [`Source`] it was built from. Equality ignores it,
//! so a statement compares equal to the one obtained by printing and
//! parsing it again.
pub mod tokens;
pub mod expressions;
pub mod operators;
pub mod query;
pub mod statements;

pub use tokens::{Position, Source, Token, TokenKind};
pub use expressions::{Expr, ExprKind, Literal, NameSegment, QualifiedName};
pub use operators::{ArithmeticOp, ComparisonOp, LogicalOp, PredicateKind, UnaryOp};
pub use query::{
    EventCategory, EventFilter, EventQuery, Join, JoinTerm, Query, Sequence, SequenceTerm,
    TermParameter, TimeUnit, TimeValue,
};
pub use statements::{Pipe, Statement};
