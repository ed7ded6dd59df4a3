//! Suggestion engine: variant-aware candidate matching and ranking.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unic_ucd_category::GeneralCategory;

use crate::distance::WeightTable;
use crate::speller::suggestion::{Suggestion, Trace};
use crate::tokenizer::case_handling::lower_case;
use crate::vocab::Vocabulary;

pub mod error;
pub mod matcher;
pub mod suggestion;
mod worker;

pub use self::error::SuggestError;
pub use self::worker::{suggest, suggest_with_trace};

/// Limits of a suggestion request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellerConfig {
    /// largest edit distance between a variant and a suggested token
    pub max_distance: usize,
    /// number of suggestions returned, also the per-variant match limit
    pub n_best: usize,
    /// largest number of substituted units in a variant
    pub max_variant_edits: usize,
    /// beam width of the variant generator
    pub max_variant_candidates: usize,
    /// re-apply the casing of the input word to the suggestions
    pub case_handling: bool,
}

impl Default for SpellerConfig {
    fn default() -> SpellerConfig {
        SpellerConfig {
            max_distance: 2,
            n_best: 5,
            max_variant_edits: 3,
            max_variant_candidates: 40,
            case_handling: false,
        }
    }
}

impl SpellerConfig {
    /// Rejects limits that cannot produce any suggestion.
    pub fn validate(&self) -> Result<(), SuggestError> {
        if self.n_best == 0 {
            return Err(SuggestError::InvalidArgument(
                "n_best must be at least 1".into(),
            ));
        }

        if self.max_variant_candidates == 0 {
            return Err(SuggestError::InvalidArgument(
                "max_variant_candidates must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

/// A spell checker that can be shared between threads behind an `Arc`.
pub trait Speller {
    /// Whether `word` is known, ignoring case. Words without letters count
    /// as correct.
    fn is_correct(self: Arc<Self>, word: &str) -> bool;
    /// Suggestions with the default configuration.
    fn suggest(self: Arc<Self>, word: &str) -> Result<Vec<Suggestion>, SuggestError>;
    /// Suggestions with the given limits.
    fn suggest_with_config(
        self: Arc<Self>,
        word: &str,
        config: &SpellerConfig,
    ) -> Result<Vec<Suggestion>, SuggestError>;
    /// Suggestions plus a record of the variants that were probed.
    fn suggest_with_trace(
        self: Arc<Self>,
        word: &str,
        config: &SpellerConfig,
    ) -> Result<(Vec<Suggestion>, Trace), SuggestError>;
}

/// Speller over a frequency vocabulary, optionally with substitution costs.
#[derive(Debug)]
pub struct VocabSpeller {
    vocabulary: Arc<Vocabulary>,
    weights: Option<Arc<WeightTable>>,
}

impl VocabSpeller {
    /// creates a speller
    pub fn new(vocabulary: Arc<Vocabulary>, weights: Option<Arc<WeightTable>>) -> Arc<VocabSpeller> {
        Arc::new(VocabSpeller {
            vocabulary,
            weights,
        })
    }

    /// gets the vocabulary
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// gets the substitution costs, if any
    pub fn weights(&self) -> Option<&WeightTable> {
        self.weights.as_deref()
    }
}

impl Speller for VocabSpeller {
    fn is_correct(self: Arc<Self>, word: &str) -> bool {
        if word.is_empty() {
            return true;
        }

        // Check if there are zero letters in the word according to
        // Unicode letter category
        if word.chars().all(|c| !GeneralCategory::of(c).is_letter()) {
            return true;
        }

        self.vocabulary.contains(&lower_case(word))
    }

    #[inline]
    fn suggest(self: Arc<Self>, word: &str) -> Result<Vec<Suggestion>, SuggestError> {
        self.suggest_with_config(word, &SpellerConfig::default())
    }

    fn suggest_with_config(
        self: Arc<Self>,
        word: &str,
        config: &SpellerConfig,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        worker::suggest(word, &self.vocabulary, config, self.weights())
    }

    fn suggest_with_trace(
        self: Arc<Self>,
        word: &str,
        config: &SpellerConfig,
    ) -> Result<(Vec<Suggestion>, Trace), SuggestError> {
        worker::suggest_with_trace(word, &self.vocabulary, config, self.weights())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speller() -> Arc<VocabSpeller> {
        let vocabulary = Vocabulary::from_entries(vec![("çay", 10), ("içdik", 2)]).unwrap();
        VocabSpeller::new(Arc::new(vocabulary), None)
    }

    #[test]
    fn is_correct() {
        let speller = speller();
        assert!(speller.clone().is_correct("çay"));
        assert!(speller.clone().is_correct("Çay"));
        assert!(speller.clone().is_correct("İçdik"));
        assert!(speller.clone().is_correct(""));
        assert!(speller.clone().is_correct("123"));
        assert!(!speller.is_correct("cay"));
    }

    #[test]
    fn suggest_uses_defaults() {
        let speller = speller();
        let suggestions = speller.clone().suggest("cay").unwrap();
        assert_eq!(suggestions[0].value(), "çay");
        assert_eq!(
            suggestions,
            speller
                .suggest_with_config("cay", &SpellerConfig::default())
                .unwrap()
        );
    }

    #[test]
    fn uses_weights() {
        let vocabulary = Vocabulary::from_entries(vec![("bax", 1), ("bəy", 1)]).unwrap();
        let mut weights = WeightTable::new();
        weights.insert('a', 'ə', 0.1).unwrap();
        let speller = VocabSpeller::new(Arc::new(vocabulary), Some(Arc::new(weights)));

        let config = SpellerConfig {
            max_distance: 1,
            n_best: 1,
            ..SpellerConfig::default()
        };
        let (suggestions, trace) = speller.suggest_with_trace("bay", &config).unwrap();
        assert_eq!(suggestions, vec![Suggestion::new("bəy", 1)]);
        assert_eq!(trace.checked.len(), 1);
    }

    #[test]
    fn config_defaults_and_partial_json() {
        let config: SpellerConfig = serde_json::from_str(r#"{"n_best": 10}"#).unwrap();
        assert_eq!(
            config,
            SpellerConfig {
                n_best: 10,
                ..SpellerConfig::default()
            }
        );
        assert!(SpellerConfig::default().validate().is_ok());
    }

    #[test]
    fn shared_across_threads() {
        let speller = speller();
        let handles = (0..4)
            .map(|_| {
                let speller = speller.clone();
                std::thread::spawn(move || speller.suggest("cay").unwrap())
            })
            .collect::<Vec<_>>();

        for handle in handles {
            assert_eq!(handle.join().unwrap()[0].value(), "çay");
        }
    }
}
