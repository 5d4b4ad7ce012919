use std::any::Any;
use std::sync::Arc;

use tracing::trace;

use crate::ast::Source;
use crate::plan::{ActionListener, Attribute, EmptyExecutable, Executable, Payload, Session};

/// Leaf wrapping an executable whose result needs no further planning.
///
/// Output and execution are delegated unchanged. Two `LocalExec`s are equal
/// when their executables are.
#[derive(Debug, Clone)]
pub struct LocalExec {
    source: Source,
    executable: Arc<dyn Executable>,
}

impl LocalExec {
    pub fn new(source: Source, executable: Arc<dyn Executable>) -> Self {
        LocalExec { source, executable }
    }

    /// Leaf producing no rows with the given columns.
    pub fn empty(source: Source, output: Vec<Attribute>) -> Self {
        LocalExec::new(source, Arc::new(EmptyExecutable::new(output)))
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn executable(&self) -> &Arc<dyn Executable> {
        &self.executable
    }

    /// True only when the wrapped executable is an [`EmptyExecutable`].
    pub fn is_empty(&self) -> bool {
        self.executable.as_any().is::<EmptyExecutable>()
    }
}

impl Executable for LocalExec {
    fn output(&self) -> Vec<Attribute> {
        self.executable.output()
    }

    fn execute(&self, session: &Session, listener: ActionListener<Payload>) {
        trace!(empty = self.is_empty(), "delegating local execution");
        self.executable.execute(session, listener);
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

impl PartialEq for LocalExec {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.executable, &other.executable)
            || self.executable.dyn_eq(other.executable.as_ref())
    }
}
