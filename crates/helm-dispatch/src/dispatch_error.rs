//! Error taxonomy for tree construction and dispatch.
//!
//! Build-time violations (`TreeBuildError`) are fatal and raised before the
//! tree ever dispatches. Argument parse failures carry a kind so argument
//! definitions can map specific kinds to user-facing messages; anything
//! unmapped propagates as a `DispatchError` and is contained only at the
//! outermost `execute` boundary.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Enumerates supported `ArgumentErrorKind` values.
pub enum ArgumentErrorKind {
    InvalidInteger,
    IntegerOutOfRange,
    InvalidFloat,
    InvalidBoolean,
    UnknownChoice,
    InvalidValue,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
/// Failure raised by an argument parser, tagged with its kind.
pub struct ParseFailure {
    pub kind: ArgumentErrorKind,
    pub message: String,
}

impl ParseFailure {
    pub fn new(kind: ArgumentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `DispatchError` values.
pub enum DispatchError {
    #[error("argument `{argument}` rejected token `{token}`: {failure}")]
    ArgumentParse {
        argument: String,
        token: String,
        failure: ParseFailure,
    },
    #[error("handler for `{command}` failed: {reason}")]
    HandlerFailed {
        command: String,
        reason: anyhow::Error,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// Enumerates supported `TreeBuildError` values.
pub enum TreeBuildError {
    #[error("invalid command name `{0}`")]
    InvalidCommandName(String),
    #[error("invalid alias `{alias}` on command `{command}`")]
    InvalidAlias { command: String, alias: String },
    #[error("invalid argument name `{argument}` on command `{command}`")]
    InvalidArgumentName { command: String, argument: String },
    #[error("duplicate argument name `{argument}` on command `{command}`")]
    DuplicateArgumentName { command: String, argument: String },
    #[error("greedy text argument `{argument}` must terminate the argument list of `{command}`")]
    GreedyArgumentNotLast { command: String, argument: String },
    #[error("default value on mandatory argument `{argument}` of command `{command}`")]
    DefaultOnMandatoryArgument { command: String, argument: String },
    #[error("command `{command}` mixes optional arguments with child command `{child}`")]
    OptionalArgumentsWithChildren { command: String, child: String },
    #[error("duplicate child name or alias `{name}` under command `{command}`")]
    DuplicateChildName { command: String, name: String },
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("help page index {requested} is out of range ({pages} pages)")]
/// Raised when a caller requests a help page past the last one.
pub struct HelpPageOutOfRange {
    pub requested: usize,
    pub pages: usize,
}
