//! Error and status types.
//!
//! Role
//! - [`FixJsonError`] is the rich, payload-carrying error returned by fallible
//!   methods. [`FixJsonStatus`] is the plain copy-type mirror stored on the
//!   context itself, since the context cannot borrow the error's payload
//!   without outliving the call that produced it.
use strum::{Display, EnumIs};

use crate::token::TokenType;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FixJsonError>;

/// Everything that can go wrong inside the engine.
#[derive(Debug, thiserror::Error)]
pub enum FixJsonError {
    #[error("context pointer failed validation (cookie or bounds mismatch)")]
    InvalidContext,

    #[error("invalid argument: {0}")]
    InvalidParameter(&'static str),

    #[error("out of memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },

    #[error("unexpected symbol {found:?} at line {line}, column {column}")]
    UnexpectedSymbol { found: u8, line: usize, column: usize },

    #[error("unexpected token {found:?} at line {line}, column {column}")]
    UnexpectedToken {
        found: TokenType,
        line: usize,
        column: usize,
    },

    #[error("unexpected element in current parser state")]
    UnexpectedElement,

    #[error("unexpected end of input at line {line}, column {column}")]
    UnexpectedEof { line: usize, column: usize },

    #[error("invalid number literal at line {line}, column {column}")]
    InvalidNumber { line: usize, column: usize },

    #[error("invalid unicode escape at line {line}, column {column}")]
    InvalidUnicode { line: usize, column: usize },

    #[error("element not found")]
    ElementNotFound,

    #[error("duplicate key")]
    DuplicateKey,

    #[error("path exceeds the maximum allowed length")]
    PathTooLong,

    #[error("parsing failed")]
    ParsingFailed,

    #[error("render failed")]
    RenderFailed,

    #[error("broken tree: an invariant was violated")]
    BrokenTree,

    #[error("invalid operation for the current tree/element state")]
    InvalidOperation,
}

impl FixJsonError {
    /// Map this error onto its plain [`FixJsonStatus`] discriminant.
    pub fn status(&self) -> FixJsonStatus {
        match self {
            FixJsonError::InvalidContext => FixJsonStatus::InvalidContext,
            FixJsonError::InvalidParameter(_) => FixJsonStatus::InvalidParameter,
            FixJsonError::OutOfMemory { .. } => FixJsonStatus::OutOfMemory,
            FixJsonError::UnexpectedSymbol { .. } => FixJsonStatus::UnexpectedSymbol,
            FixJsonError::UnexpectedToken { .. } => FixJsonStatus::UnexpectedToken,
            FixJsonError::UnexpectedElement => FixJsonStatus::UnexpectedElement,
            FixJsonError::UnexpectedEof { .. } => FixJsonStatus::UnexpectedEof,
            FixJsonError::InvalidNumber { .. } => FixJsonStatus::InvalidNumber,
            FixJsonError::InvalidUnicode { .. } => FixJsonStatus::InvalidUnicode,
            FixJsonError::ElementNotFound => FixJsonStatus::ElementNotFound,
            FixJsonError::DuplicateKey => FixJsonStatus::DuplicateKey,
            FixJsonError::PathTooLong => FixJsonStatus::PathTooLong,
            FixJsonError::ParsingFailed => FixJsonStatus::ParsingFailed,
            FixJsonError::RenderFailed => FixJsonStatus::RenderFailed,
            FixJsonError::BrokenTree => FixJsonStatus::BrokenTree,
            FixJsonError::InvalidOperation => FixJsonStatus::InvalidOperation,
        }
    }
}

/// Plain copy-type status code, the kind recorded on [`crate::Context`] after
/// every public call. See [`FixJsonError`] for the payload-carrying sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
#[repr(u8)]
pub enum FixJsonStatus {
    NoError = 0,
    InvalidContext,
    InvalidParameter,
    OutOfMemory,
    UnexpectedSymbol,
    UnexpectedToken,
    UnexpectedElement,
    UnexpectedEof,
    InvalidNumber,
    InvalidUnicode,
    ElementNotFound,
    DuplicateKey,
    PathTooLong,
    ParsingFailed,
    RenderFailed,
    BrokenTree,
    InvalidOperation,
}

impl Default for FixJsonStatus {
    fn default() -> Self {
        FixJsonStatus::NoError
    }
}

/// Diagnostic snapshot populated whenever `load` fails, capturing enough to
/// point a caller at the offending byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusBlock {
    pub status: FixJsonStatus,
    pub token_type: Option<TokenType>,
    pub line: usize,
    pub column: usize,
}
