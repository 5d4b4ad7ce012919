//! CLI support for eql-front
//!
//! The `eql` binary is a thin wrapper over these functions, so other tools
//! can validate and normalize queries the same way.

mod check;
mod tokens;

pub use check::{execute_check, CheckOptions, CheckResult};
pub use tokens::{execute_tokens, render_tokens};

use std::io;

use thiserror::Error;

use crate::error::{ConfigError, LexError, ParseError};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoQuery,
}
