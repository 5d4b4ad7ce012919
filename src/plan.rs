//! # Physical plan leaves
//!
//! The executor drives a physical plan through the [`Executable`] trait:
//! `output()` describes the columns, `execute()` produces a [`Payload`] and
//! reports it through a one-shot [`ActionListener`].
//!
//! [`LocalExec`] is the leaf for results known before execution starts,
//! typically an optimizer proving a query can return nothing and replacing
//! it with an [`EmptyExecutable`].
pub mod executable;
pub mod local;

pub use executable::{
    execute_async, ActionListener, Attribute, EmptyExecutable, Executable,
    MaterializedExecutable, Payload, PayloadKind, Session,
};
pub use local::LocalExec;
