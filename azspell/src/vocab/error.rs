//! Vocabulary-related errors.
use smol_str::SmolStr;

/// Errors that can occur when building, loading or saving a vocabulary.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum VocabularyError {
    /// I/O error while reading or writing a file
    #[error("I/O error on '{0}'")]
    Io(String, #[source] std::io::Error),

    /// Error reading or writing tab/comma separated data
    #[error("Failed to process delimited file")]
    Csv(#[from] csv::Error),

    /// Corpus CSV has no `text` column
    #[error("Corpus '{0}' has no `text` column")]
    MissingTextColumn(String),

    /// Frequency column is not a positive integer
    #[error("Invalid frequency {value:?} on line {line}")]
    InvalidFrequency {
        /// line number in the source file
        line: u64,
        /// the offending field
        value: String,
    },

    /// A token was given a frequency of zero
    #[error("Token {0:?} has zero frequency")]
    ZeroFrequency(SmolStr),

    /// A token appears more than once
    #[error("Token {0:?} appears more than once")]
    DuplicateToken(SmolStr),

    /// Error writing the JSON build summary
    #[error("Failed to write build summary")]
    Json(#[from] serde_json::Error),
}
