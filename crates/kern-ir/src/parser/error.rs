//! Parse error types.

use alloc::string::String;

use thiserror::Error;

/// Parse error with position information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the parsed text
    pub position: usize,
}

pub(crate) fn parse_error(original_input: &str, remaining_input: &str, message: String) -> ParseError {
    ParseError {
        message,
        position: original_input.len() - remaining_input.len(),
    }
}
