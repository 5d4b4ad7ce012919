use serde::Serialize;

use crate::ast::{Expr, Query, Source};

/// A complete EQL statement: a query followed by its pipes.
///
/// # Example
/// ```text
/// process where true | head 10 | tail 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Statement {
    pub query: Query,
    pub pipes: Vec<Pipe>,
}

/// Post-processing stage.
///
/// The pipe name is not interpreted here; `head`, `tail`, `filter` and
/// friends are resolved by the semantic layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pipe {
    pub source: Source,
    pub kind: String,
    pub args: Vec<Expr>,
}
