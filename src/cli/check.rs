//! Validate queries and print them back normalized

use super::CliError;
use crate::ast::{Expr, Statement};
use crate::config::ParserConfig;
use crate::parser::EqlParser;
use crate::printer::{expression_to_eql, to_eql, to_eql_pretty};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The EQL query to validate
    pub query: String,
    /// One term and one pipe per line, or indented JSON
    pub pretty: bool,
    /// Print the AST as JSON instead of EQL
    pub json: bool,
    /// Parse a standalone expression rather than a statement
    pub expression: bool,
    pub parser: ParserConfig,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    Statement(Statement),
    Expression(Expr),
}

impl CheckResult {
    /// Renders the parsed query the way `options` asks for.
    pub fn render(&self, options: &CheckOptions) -> Result<String, CliError> {
        if options.json {
            let json = match self {
                CheckResult::Statement(statement) => serde_json::to_value(statement)?,
                CheckResult::Expression(expr) => serde_json::to_value(expr)?,
            };
            let text = if options.pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            return Ok(text);
        }

        Ok(match self {
            CheckResult::Statement(statement) if options.pretty => to_eql_pretty(statement),
            CheckResult::Statement(statement) => to_eql(statement),
            CheckResult::Expression(expr) => expression_to_eql(expr),
        })
    }
}

/// Parse the query in `options`
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let parser = EqlParser::with_config(options.parser.clone());
    if options.expression {
        Ok(CheckResult::Expression(
            parser.create_expression(&options.query)?,
        ))
    } else {
        Ok(CheckResult::Statement(
            parser.create_statement(&options.query)?,
        ))
    }
}
