use std::any::Any;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;

use crate::config::SessionConfig;
use crate::error::ExecutionError;

/// Completion callback. Being `FnOnce`, it can fire at most once.
pub type ActionListener<T> = Box<dyn FnOnce(Result<T, ExecutionError>) + Send>;

/// A column produced by a plan node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Attribute {
    pub name: String,
    pub data_type: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PayloadKind {
    Event,
    Sequence,
}

/// Result of running a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub kind: PayloadKind,
    pub took: Duration,
    pub values: Vec<serde_json::Value>,
}

impl Payload {
    pub fn new(kind: PayloadKind, took: Duration, values: Vec<serde_json::Value>) -> Self {
        Payload { kind, took, values }
    }

    /// No rows, no time spent.
    pub fn empty(kind: PayloadKind) -> Self {
        Payload::new(kind, Duration::ZERO, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-query execution context.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session { config }
    }
}

/// Something that produces a [`Payload`].
///
/// `as_any` and `dyn_eq` give trait objects identity and structural
/// equality, which plan nodes holding an `Arc<dyn Executable>` compare by.
pub trait Executable: fmt::Debug + Send + Sync {
    fn output(&self) -> Vec<Attribute>;

    /// Starts execution and reports the outcome through `listener`.
    fn execute(&self, session: &Session, listener: ActionListener<Payload>);

    fn as_any(&self) -> &dyn Any;

    fn dyn_eq(&self, other: &dyn Executable) -> bool;
}

/// Produces no rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmptyExecutable {
    output: Vec<Attribute>,
}

impl EmptyExecutable {
    pub fn new(output: Vec<Attribute>) -> Self {
        EmptyExecutable { output }
    }
}

impl Executable for EmptyExecutable {
    fn output(&self) -> Vec<Attribute> {
        self.output.clone()
    }

    fn execute(&self, _session: &Session, listener: ActionListener<Payload>) {
        listener(Ok(Payload::empty(PayloadKind::Event)));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Executable) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }
}

/// Hands back a payload computed ahead of time.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedExecutable {
    output: Vec<Attribute>,
    payload: Payload,
}

impl MaterializedExecutable {
    pub fn new(output: Vec<Attribute>, payload: Payload) -> Self {
        MaterializedExecutable { output, payload }
    }
}

impl Executable for MaterializedExecutable {
    fn output(&self) -> Vec<Attribute> {
        self.output.clone()
    }

    fn execute(&self, _session: &Session, listener: ActionListener<Payload>) {
        listener(Ok(self.payload.clone()));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Executable) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }
}

/// Runs `executable` and waits for its listener.
///
/// An executable that drops the listener without calling it resolves to
/// [`ExecutionError::ListenerDropped`].
pub async fn execute_async(
    executable: &dyn Executable,
    session: &Session,
) -> Result<Payload, ExecutionError> {
    let (tx, rx) = oneshot::channel();
    executable.execute(
        session,
        Box::new(move |result| {
            // The receiver only goes away if the caller stopped waiting.
            let _ = tx.send(result);
        }),
    );
    match rx.await {
        Ok(result) => result,
        Err(_) => Err(ExecutionError::ListenerDropped),
    }
}
