//! Dump the token stream of a query

use super::CliError;
use crate::ast::{Token, TokenKind};
use crate::lexer::Lexer;

/// Every token of `query`, hidden ones included, up to and including `Eof`.
pub fn execute_tokens(query: &str) -> Result<Vec<Token>, CliError> {
    let mut lexer = Lexer::new(query);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// One line per token: `line:column KIND text`.
pub fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| {
            format!(
                "{:<8} {:<20} {}",
                token.position.to_string(),
                format!("{:?}", token.kind),
                token
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
