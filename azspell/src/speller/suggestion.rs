//! Suggestion for a spelling correction.
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::types::Frequency;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Suggestion for a spelling correction
pub struct Suggestion {
    /// the suggested word-form
    pub value: SmolStr,
    /// corpus frequency of the word-form
    pub freq: Frequency,
}

impl Suggestion {
    /// creates a spelling correction suggestion
    pub fn new<S: Into<SmolStr>>(value: S, freq: Frequency) -> Suggestion {
        Suggestion {
            value: value.into(),
            freq,
        }
    }

    /// gets the suggested word-form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// gets the corpus frequency of the suggestion
    pub fn freq(&self) -> Frequency {
        self.freq
    }
}

/// More frequent suggestions sort first, ties broken by value.
impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| self.value.cmp(&other.value))
    }
}

/// A vocabulary token matched during one request, with the best evidence
/// found for it so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoredCandidate {
    /// the matched vocabulary token
    pub token: SmolStr,
    /// its corpus frequency
    pub freq: Frequency,
    /// edits of the variant that matched it
    pub edits: usize,
    /// unit-cost distance between that variant and the token, computed with
    /// a bound two above the match limit. With substitution weights the
    /// matcher can accept tokens whose unit distance exceeds the limit; they
    /// keep that larger distance here.
    pub distance: usize,
}

impl ScoredCandidate {
    /// creates a scored candidate
    pub fn new(token: SmolStr, freq: Frequency, edits: usize, distance: usize) -> ScoredCandidate {
        ScoredCandidate {
            token,
            freq,
            edits,
            distance,
        }
    }

    /// turns the candidate into its public form
    pub fn into_suggestion(self) -> Suggestion {
        Suggestion::new(self.token, self.freq)
    }
}

/// Ranking order: distance, then frequency (descending), then variant edits,
/// then token.
impl PartialOrd for ScoredCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.freq.cmp(&self.freq))
            .then_with(|| self.edits.cmp(&other.edits))
            .then_with(|| self.token.cmp(&other.token))
    }
}

/// One variant probed during a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbedVariant {
    /// the respelled query
    pub variant: SmolStr,
    /// substituted unit count
    pub edits: usize,
    /// number of tokens the matcher returned for it, before merging
    pub matches: usize,
}

/// Diagnostic record of a suggestion request. Never affects the ranking.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// lowercased query
    pub query: SmolStr,
    /// variant edit limit in effect
    pub max_edits: usize,
    /// variant beam width in effect
    pub max_candidates: usize,
    /// variants in probing order
    pub checked: Vec<ProbedVariant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_order() {
        let mut suggestions = vec![
            Suggestion::new("kitab", 3),
            Suggestion::new("çay", 10),
            Suggestion::new("bay", 3),
        ];
        suggestions.sort();
        let values = suggestions.iter().map(Suggestion::value).collect::<Vec<_>>();
        assert_eq!(values, vec!["çay", "bay", "kitab"]);
    }

    #[test]
    fn candidate_order() {
        let a = ScoredCandidate::new("çay".into(), 1, 0, 0);
        let b = ScoredCandidate::new("bay".into(), 9, 0, 1);
        assert!(a < b);

        let c = ScoredCandidate::new("çay".into(), 1, 2, 0);
        let d = ScoredCandidate::new("çay".into(), 1, 1, 0);
        assert!(d < c);

        let e = ScoredCandidate::new("bay".into(), 5, 0, 1);
        assert!(b < e);
    }

    #[test]
    fn suggestion_json() {
        let json = serde_json::to_string(&Suggestion::new("çay", 10)).unwrap();
        assert_eq!(json, r#"{"value":"çay","freq":10}"#);
    }
}
