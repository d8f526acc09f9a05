use std::path::PathBuf;

use thiserror::Error;

/// Errors from summary generation and result persistence.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Network or TLS failure talking to the text-generation endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The text-generation endpoint answered, but not with a completion.
    #[error("text generation failed: {0}")]
    Generation(String),

    /// The completion was not the expected pros/cons/summary JSON object.
    #[error("malformed summary response: {0}")]
    MalformedSummary(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported results file {0}: expected a .json or .csv file")]
    UnsupportedFile(PathBuf),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
