//! Linear scan of the vocabulary for tokens close to a query.
use std::cmp::Ordering;

use crate::distance::{edit_distance, weighted_distance, WeightTable};
use crate::speller::suggestion::Suggestion;
use crate::types::Weight;
use crate::vocab::Vocabulary;

/// Returns up to `n_best` vocabulary tokens within `max_distance` of `query`,
/// closest first, then most frequent, then by token.
///
/// With `weights` the weighted distance is used for both the bound and the
/// ordering.
pub fn find_candidates(
    query: &str,
    vocabulary: &Vocabulary,
    max_distance: usize,
    n_best: usize,
    weights: Option<&WeightTable>,
) -> Vec<Suggestion> {
    if n_best == 0 {
        return vec![];
    }

    let bound = max_distance as Weight;
    let mut scored = vocabulary
        .iter()
        .filter_map(|(token, freq)| {
            let distance = match weights {
                Some(weights) => weighted_distance(query, token, weights, Some(bound)),
                None => edit_distance(query, token, Some(max_distance)) as Weight,
            };

            if distance <= bound {
                Some((distance, Suggestion::new(token, freq)))
            } else {
                None
            }
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });
    scored.truncate(n_best);

    scored.into_iter().map(|(_, suggestion)| suggestion).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(Suggestion::value).collect()
    }

    fn vocabulary() -> Vocabulary {
        Vocabulary::from_entries(vec![
            ("azərbaycan", 10),
            ("azerbaycan", 5),
            ("kitab", 3),
            ("bay", 2),
            ("çay", 2),
            ("cay", 1),
        ])
        .unwrap()
    }

    #[test]
    fn respects_bound() {
        let vocabulary = vocabulary();
        for query in &["cay", "azrbaycan", "kitap", "x"] {
            for suggestion in find_candidates(query, &vocabulary, 1, 10, None) {
                assert!(edit_distance(query, suggestion.value(), None) <= 1);
            }
        }
    }

    #[test]
    fn orders_by_distance_frequency_token() {
        let vocabulary = vocabulary();
        let found = find_candidates("cay", &vocabulary, 1, 10, None);
        assert_eq!(values(&found), vec!["cay", "bay", "çay"]);

        let found = find_candidates("azrbaycan", &vocabulary, 2, 10, None);
        assert_eq!(values(&found), vec!["azərbaycan", "azerbaycan"]);
    }

    #[test]
    fn truncates_to_n_best() {
        let vocabulary = vocabulary();
        assert_eq!(values(&find_candidates("cay", &vocabulary, 1, 1, None)), vec!["cay"]);
        assert!(find_candidates("cay", &vocabulary, 1, 0, None).is_empty());
    }

    #[test]
    fn weights_change_order() {
        let vocabulary = Vocabulary::from_entries(vec![("bay", 1), ("çay", 1)]).unwrap();
        let mut weights = WeightTable::new();
        weights.insert('c', 'ç', 0.25).unwrap();

        let plain = find_candidates("cay", &vocabulary, 1, 5, None);
        assert_eq!(values(&plain), vec!["bay", "çay"]);

        let weighted = find_candidates("cay", &vocabulary, 1, 5, Some(&weights));
        assert_eq!(values(&weighted), vec!["çay", "bay"]);
    }

    #[test]
    fn empty_vocabulary() {
        assert!(find_candidates("cay", &Vocabulary::default(), 2, 5, None).is_empty());
    }
}
