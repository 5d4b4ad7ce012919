//! Error types shared by the lexer, parser and AST builder.

use thiserror::Error;

use crate::ast::{Position, TokenKind};

/// What went wrong while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("unterminated quoted identifier")]
    UnterminatedIdentifier,

    #[error("invalid escape sequence '{0}'")]
    InvalidEscape(String),

    #[error("use double quotes [\"] to define string literals, not single quotes [']")]
    SingleQuotedString,
}

/// The input could not be split into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {position}: {kind}")]
pub struct LexError {
    pub position: Position,
    pub kind: LexErrorKind,
}

impl LexError {
    pub fn new(position: Position, kind: LexErrorKind) -> Self {
        LexError { position, kind }
    }
}

/// The token stream does not match any alternative of the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {position}: mismatched input {found} expecting {}", format_expected(.expected))]
pub struct SyntaxError {
    pub position: Position,
    /// Rendering of the offending token, `<EOF>` at end of input.
    pub found: String,
    pub found_kind: TokenKind,
    /// Tokens that would have been accepted at `position`.
    pub expected: Vec<TokenKind>,
}

fn format_expected(expected: &[TokenKind]) -> String {
    match expected {
        [single] => single.to_string(),
        many => {
            let names: Vec<String> = many.iter().map(ToString::to_string).collect();
            format!("{{{}}}", names.join(", "))
        }
    }
}

/// A parse tree that violates a grammar invariant reached the AST builder.
///
/// Trees produced by the parser always convert; this only fires for trees
/// assembled by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {position}: cannot build AST: {message}")]
pub struct BuildError {
    pub position: Position,
    pub message: String,
}

impl BuildError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        BuildError {
            position,
            message: message.into(),
        }
    }
}

/// Any failure turning query text into an AST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Boxed so that every parse result carrying an error stays small.
    #[error(transparent)]
    Syntax(Box<SyntaxError>),

    /// Syntactically valid input rejected by a check made while parsing
    /// (nesting depth, numeric range, time units).
    #[error("line {position}: {message}")]
    Invalid { position: Position, message: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl From<SyntaxError> for ParseError {
    fn from(error: SyntaxError) -> Self {
        ParseError::Syntax(Box::new(error))
    }
}

impl ParseError {
    pub fn invalid(position: Position, message: impl Into<String>) -> Self {
        ParseError::Invalid {
            position,
            message: message.into(),
        }
    }

    /// Where in the input the error was detected.
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position,
            ParseError::Syntax(e) => e.position,
            ParseError::Invalid { position, .. } => *position,
            ParseError::Build(e) => e.position,
        }
    }
}

/// Failure reported by an executable through its completion listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("execution failed: {0}")]
    Failed(String),

    /// The executable dropped its listener without completing it.
    #[error("execution finished without reporting a result")]
    ListenerDropped,
}

/// Configuration could not be read or decoded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
