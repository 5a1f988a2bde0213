// src/error.rs
//
// Everything that can make a single format call fail. There is no partial
// success: the first error aborts the whole call.

use thiserror::Error;

use crate::ast::NodeKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The source could not be turned into a tree.
    #[error("parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// The children planner was asked to lay out a node that cannot own children.
    #[error("attempting to lay out children of {kind}, which has no children")]
    ChildlessLayout { kind: NodeKind },

    #[error("invalid value {value:?} for option `{name}`")]
    InvalidOption { name: &'static str, value: String },
}

impl FormatError {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        FormatError::Parse {
            offset,
            message: message.into(),
        }
    }
}
