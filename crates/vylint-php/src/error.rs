//! Error type for rule evaluation.
//!
//! Malformed PHP is never an error: missing boundaries make the affected
//! check bail out quietly. A [`SniffError`] means the rule itself asked the
//! token stream something it should not have (a lookup on the wrong token
//! kind) or built an invalid changeset, and it always propagates to the host.

use thiserror::Error;

use vylint_core::error::VylintError;
use vylint_core::patch::PatchError;

use crate::tokens::TokenKind;

/// Error type for rule evaluation.
#[derive(Debug, Error)]
pub enum SniffError {
    /// A lookup was called with a token of the wrong kind.
    #[error("token {index} must be {expected}, found {}", describe(.found))]
    UnexpectedToken {
        index: usize,
        expected: &'static str,
        /// `None` when the index is past the end of the stream.
        found: Option<TokenKind>,
    },

    /// A generated fix could not be turned into a changeset.
    #[error("invalid fix: {0}")]
    Patch(#[from] PatchError),
}

fn describe(found: &Option<TokenKind>) -> String {
    match found {
        Some(kind) => format!("{:?}", kind),
        None => "end of stream".to_string(),
    }
}

/// Result type for rule evaluation.
pub type SniffResult<T> = Result<T, SniffError>;

impl From<SniffError> for VylintError {
    fn from(err: SniffError) -> Self {
        match err {
            SniffError::Patch(patch) => VylintError::from(patch),
            other => VylintError::internal(other.to_string()),
        }
    }
}
