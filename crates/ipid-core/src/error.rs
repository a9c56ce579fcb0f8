use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IpidError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("input is not a PDF document (missing %PDF- header)")]
    NotAPdf,

    #[error("failed to load anchor table from {path}: {reason}")]
    AnchorTableLoad { path: PathBuf, reason: String },

    #[error("invalid anchor table: {0}")]
    AnchorTableInvalid(String),

    #[error("anchor '{name}' has an invalid pattern: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IpidError {
    /// True when the page provider could not produce pages for the input.
    ///
    /// These are the only failures a caller should report as bad input; every
    /// other condition after extraction resolves to a (possibly empty) document.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            IpidError::Extraction(_) | IpidError::PdftotextFailed { .. } | IpidError::NotAPdf
        )
    }
}
