//! Translation errors.

use crate::ir::NodeKind;

/// Error that can occur while translating a tree into source text.
///
/// Translation stops at the first error; no partial script is produced.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("node kind {kind} has no textual translation")]
    UnsupportedNode { kind: NodeKind },

    #[error("operator {kind} has no textual translation")]
    UnsupportedOperator { kind: NodeKind },

    #[error("unsupported dynamic binder: {binder}")]
    UnsupportedBinder { binder: String },

    #[error("cannot handle non-public method {method}: {reason}")]
    NonPublicMethod { method: String, reason: String },

    #[error("invalid tree: {0}")]
    InvalidShape(String),
}

pub type Result<T, E = TranslateError> = std::result::Result<T, E>;
