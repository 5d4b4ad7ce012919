//! Front-end for the Event Query Language.
//!
//! Query text goes through the [`lexer`], the [`parser`] (which produces a
//! [`parse_tree`]) and the [`builder`], ending up as a typed [`ast`]. The
//! [`printer`] turns an AST back into EQL, and [`plan`] holds the physical
//! plan leaf for results known before execution.
//!
//! ```
//! use eql_front::ast::Query;
//!
//! let statement = eql_front::parse_statement(
//!     "sequence by user.name [process where true] [network where true]",
//! )
//! .unwrap();
//! assert!(matches!(statement.query, Query::Sequence(_)));
//! ```
pub mod ast;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parse_tree;
pub mod parser;
pub mod plan;
pub mod printer;

pub use ast::{Expr, Position, Query, Statement, Token, TokenKind};
pub use builder::AstBuilder;
pub use config::{EqlConfig, ParserConfig, SessionConfig};
pub use error::{BuildError, ConfigError, ExecutionError, LexError, ParseError, SyntaxError};
pub use lexer::{tokenize, Lexer};
pub use parser::{EqlParser, Parser};
pub use plan::{EmptyExecutable, Executable, LocalExec, Payload, Session};
pub use printer::{expression_to_eql, to_eql, to_eql_pretty};

/// Parses a statement with the default [`ParserConfig`].
pub fn parse_statement(eql: &str) -> Result<Statement, ParseError> {
    EqlParser::new().create_statement(eql)
}

/// Parses a standalone expression with the default [`ParserConfig`].
pub fn parse_expression(eql: &str) -> Result<Expr, ParseError> {
    EqlParser::new().create_expression(eql)
}
