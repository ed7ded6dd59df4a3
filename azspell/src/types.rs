//! Shared scalar types.

/// Cost of a weighted edit operation.
pub type Weight = f32;

/// Occurrence count of a token in the corpus.
pub type Frequency = u64;
