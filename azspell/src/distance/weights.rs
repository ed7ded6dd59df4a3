//! Confusion matrix of substitution costs.
//!
//! The persisted form is a JSON object with a `weights` member whose keys are
//! exactly two characters (the ordered pair `from`, `to`) and whose values
//! are non-negative costs:
//!
//! ```json
//! { "weights": { "eə": 0.4, "cç": 0.3 } }
//! ```
//!
//! Entries that do not follow this shape are rejected one by one; the rest of
//! the table still loads.
use std::path::Path;

use hashbrown::HashMap;
use serde_json::Value;

use crate::types::Weight;

/// Errors that make a confusion matrix unreadable as a whole.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WeightTableError {
    /// The file could not be read
    #[error("I/O error reading '{0}'")]
    Io(String, #[source] std::io::Error),

    /// The document is not valid JSON
    #[error("Failed to parse confusion matrix JSON")]
    Json(#[from] serde_json::Error),

    /// The document or its `weights` member is not a JSON object
    #[error("Confusion matrix must be an object with a `weights` object")]
    InvalidShape,
}

/// Why a single confusion matrix entry was ignored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum EntryError {
    /// Key is not exactly two characters long
    #[error("key must be exactly two characters, found {0}")]
    KeyLength(usize),

    /// Key substitutes a character by itself
    #[error("key pairs a character with itself")]
    IdenticalPair,

    /// Value is not a number
    #[error("cost is not a number")]
    NotANumber,

    /// Value is negative, infinite or NaN
    #[error("cost {0} is not a finite non-negative number")]
    InvalidCost(f64),
}

/// A confusion matrix entry that was skipped while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEntry {
    /// the raw key as found in the document
    pub key: String,
    /// reason for the rejection
    pub error: EntryError,
}

/// Substitution cost overrides keyed by ordered character pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightTable {
    costs: HashMap<(char, char), Weight>,
}

impl WeightTable {
    /// Creates an empty table where every substitution costs 1.
    pub fn new() -> WeightTable {
        WeightTable::default()
    }

    /// Sets the cost of substituting `from` by `to`.
    pub fn insert(&mut self, from: char, to: char, cost: Weight) -> Result<(), EntryError> {
        if from == to {
            return Err(EntryError::IdenticalPair);
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(EntryError::InvalidCost(cost as f64));
        }
        self.costs.insert((from, to), cost);
        Ok(())
    }

    /// Explicit override for the pair, if any.
    pub fn get(&self, from: char, to: char) -> Option<Weight> {
        self.costs.get(&(from, to)).copied()
    }

    /// Cost of substituting `from` by `to`: 0 for equal characters, the
    /// override when present, 1 otherwise.
    #[inline(always)]
    pub fn substitution(&self, from: char, to: char) -> Weight {
        if from == to {
            return 0.0;
        }
        self.get(from, to).unwrap_or(1.0)
    }

    /// Number of overridden pairs.
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    /// Whether the table overrides nothing.
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Parses a confusion matrix document, returning the table and every
    /// entry that had to be skipped.
    pub fn from_json_str(input: &str) -> Result<(WeightTable, Vec<RejectedEntry>), WeightTableError> {
        let document: Value = serde_json::from_str(input)?;
        let root = document.as_object().ok_or(WeightTableError::InvalidShape)?;

        let mut table = WeightTable::new();
        let mut rejected = vec![];

        let entries = match root.get("weights") {
            None => return Ok((table, rejected)),
            Some(Value::Object(entries)) => entries,
            Some(_) => return Err(WeightTableError::InvalidShape),
        };

        for (key, value) in entries {
            if let Err(error) = parse_entry(key, value).and_then(|(from, to, cost)| table.insert(from, to, cost)) {
                log::warn!("Ignoring confusion matrix entry {:?}: {}", key, error);
                rejected.push(RejectedEntry {
                    key: key.clone(),
                    error,
                });
            }
        }

        log::debug!(
            "Loaded {} substitution weights ({} rejected)",
            table.len(),
            rejected.len()
        );

        Ok((table, rejected))
    }

    /// Reads and parses a confusion matrix file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<(WeightTable, Vec<RejectedEntry>), WeightTableError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| WeightTableError::Io(path.to_string_lossy().to_string(), e))?;
        WeightTable::from_json_str(&input)
    }
}

fn parse_entry(key: &str, value: &Value) -> Result<(char, char, Weight), EntryError> {
    let mut chars = key.chars();
    let (from, to) = match (chars.next(), chars.next(), chars.next()) {
        (Some(from), Some(to), None) => (from, to),
        _ => return Err(EntryError::KeyLength(key.chars().count())),
    };

    let cost = value.as_f64().ok_or(EntryError::NotANumber)?;
    if !cost.is_finite() || cost < 0.0 {
        return Err(EntryError::InvalidCost(cost));
    }

    Ok((from, to, cost as Weight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_valid_entries() {
        let (table, rejected) =
            WeightTable::from_json_str(r#"{"weights": {"eə": 0.4, "cç": 0.5, "sş": 1}}"#).unwrap();

        assert!(rejected.is_empty());
        assert_eq!(table.len(), 3);
        assert_eq!(table.get('e', 'ə'), Some(0.4));
        assert_eq!(table.get('ə', 'e'), None);
        assert_eq!(table.substitution('s', 'ş'), 1.0);
        assert_eq!(table.substitution('x', 'y'), 1.0);
        assert_eq!(table.substitution('x', 'x'), 0.0);
    }

    #[test]
    fn rejects_malformed_entries_individually() {
        let (table, mut rejected) = WeightTable::from_json_str(
            r#"{"weights": {
                "eə": 0.4,
                "('e', 'ə')": 0.1,
                "e": 0.1,
                "aa": 0.1,
                "oö": "cheap",
                "uü": -1
            }}"#,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        rejected.sort_by(|a, b| a.key.cmp(&b.key));
        let errors = rejected.into_iter().map(|r| (r.key, r.error)).collect::<Vec<_>>();
        assert_eq!(
            errors,
            vec![
                ("('e', 'ə')".to_string(), EntryError::KeyLength(10)),
                ("aa".to_string(), EntryError::IdenticalPair),
                ("e".to_string(), EntryError::KeyLength(1)),
                ("oö".to_string(), EntryError::NotANumber),
                ("uü".to_string(), EntryError::InvalidCost(-1.0)),
            ]
        );
    }

    #[test]
    fn missing_weights_is_empty() {
        let (table, rejected) = WeightTable::from_json_str("{}").unwrap();
        assert!(table.is_empty());
        assert!(rejected.is_empty());
    }

    #[test]
    fn invalid_documents() {
        assert!(matches!(
            WeightTable::from_json_str("[1, 2]"),
            Err(WeightTableError::InvalidShape)
        ));
        assert!(matches!(
            WeightTable::from_json_str(r#"{"weights": []}"#),
            Err(WeightTableError::InvalidShape)
        ));
        assert!(matches!(
            WeightTable::from_json_str("{weights"),
            Err(WeightTableError::Json(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"weights": {{"iı": 0.3}}}}"#).unwrap();

        let (table, rejected) = WeightTable::load(file.path()).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(table.get('i', 'ı'), Some(0.3));

        assert!(matches!(
            WeightTable::load("/nonexistent/confusion.json"),
            Err(WeightTableError::Io(_, _))
        ));
    }
}
