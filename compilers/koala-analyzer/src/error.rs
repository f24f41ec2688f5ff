use koala_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Malformed analyzer input. `column` is a 1-based byte offset.
    #[error("line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("analyzer output could not be rebuilt: {0}")]
    Model(#[from] ModelError),

    #[error("analyzer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
