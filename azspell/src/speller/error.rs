//! Speller-related errors.

/// Errors returned by suggestion requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SuggestError {
    /// A configuration limit has a value that makes the request meaningless
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
