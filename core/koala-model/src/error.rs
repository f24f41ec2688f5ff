use koala_protocol::TagError;
use thiserror::Error;

/// Construction failures of the annotation graph. None of these are
/// recoverable: the object (or the whole reconstructed sentence) is not built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A back-reference or an annotation layer already holds a different value.
    #[error("{field} is already set to {old}; rejected {new}")]
    WriteOnce {
        field: &'static str,
        old: String,
        new: String,
    },

    #[error("{0} is required")]
    MissingField(&'static str),

    /// A positional or value lookup into the sentence's own structures failed.
    #[error("unresolved {kind}: {reference}")]
    Unresolved {
        kind: &'static str,
        reference: String,
    },

    /// The same object appears twice where each member must be distinct.
    #[error("{kind} {item} is listed more than once")]
    Duplicate {
        kind: &'static str,
        item: String,
    },

    #[error(transparent)]
    Tag(#[from] TagError),
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
