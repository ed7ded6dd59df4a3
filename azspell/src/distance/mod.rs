//! Bounded edit distance between two words.
//!
//! Both functions work on Unicode scalar values and keep a single rolling
//! row over the shorter input. Passing a bound enables early rejection: any
//! result above the bound only means "too far", results within it are exact.
use crate::types::Weight;

pub mod weights;

pub use self::weights::WeightTable;

/// Unit-cost Levenshtein distance between `a` and `b`.
///
/// With `max` set, the computation stops as soon as the distance is known to
/// exceed it and returns some value greater than `max`.
pub fn edit_distance(a: &str, b: &str, max: Option<usize>) -> usize {
    if a == b {
        return 0;
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();
    // Unit costs are symmetric, so the orientation can be swapped freely.
    let (outer, inner, outer_len) = if a_len >= b_len {
        (a, b, a_len)
    } else {
        (b, a, b_len)
    };
    let inner: Vec<char> = inner.chars().collect();

    let length_gap = outer_len - inner.len();
    if let Some(max) = max {
        if length_gap > max {
            return length_gap;
        }
    }

    if inner.is_empty() {
        return outer_len;
    }

    let mut row: Vec<usize> = (0..=inner.len()).collect();

    for (i, outer_ch) in outer.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        let mut row_min = row[0];

        for (j, inner_ch) in inner.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(outer_ch != *inner_ch);
            let value = (above + 1).min(row[j] + 1).min(substitution);

            diagonal = above;
            row[j + 1] = value;
            row_min = row_min.min(value);
        }

        if let Some(max) = max {
            if row_min > max {
                return row_min;
            }
        }
    }

    row[inner.len()]
}

/// Levenshtein distance where substituting `a_char` by `b_char` costs
/// whatever `weights` says for that ordered pair (1 when absent).
/// Insertions and deletions always cost 1.
pub fn weighted_distance(a: &str, b: &str, weights: &WeightTable, max: Option<Weight>) -> Weight {
    if a == b {
        return 0.0;
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len >= b_len {
        let inner: Vec<char> = b.chars().collect();
        rolling_weighted(a, a_len, &inner, max, |x, y| weights.substitution(x, y))
    } else {
        // Outer loop runs over `b`, so flip the pair back to (a_char, b_char).
        let inner: Vec<char> = a.chars().collect();
        rolling_weighted(b, b_len, &inner, max, |x, y| weights.substitution(y, x))
    }
}

fn rolling_weighted<F>(
    outer: &str,
    outer_len: usize,
    inner: &[char],
    max: Option<Weight>,
    substitution: F,
) -> Weight
where
    F: Fn(char, char) -> Weight,
{
    let length_gap = (outer_len - inner.len()) as Weight;
    if let Some(max) = max {
        if length_gap > max {
            return length_gap;
        }
    }

    if inner.is_empty() {
        return outer_len as Weight;
    }

    let mut row: Vec<Weight> = (0..=inner.len()).map(|j| j as Weight).collect();

    for (i, outer_ch) in outer.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = (i + 1) as Weight;
        let mut row_min = row[0];

        for (j, inner_ch) in inner.iter().enumerate() {
            let above = row[j + 1];
            let value = (above + 1.0)
                .min(row[j] + 1.0)
                .min(diagonal + substitution(outer_ch, *inner_ch));

            diagonal = above;
            row[j + 1] = value;
            row_min = row_min.min(value);
        }

        if let Some(max) = max {
            if row_min > max {
                return row_min;
            }
        }
    }

    row[inner.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: &[&str] = &[
        "",
        "a",
        "cay",
        "çay",
        "chay",
        "azərbaycan",
        "azerbaycan",
        "azrbaycan",
        "kitab",
        "şərbət",
        "sherbet",
    ];

    #[test]
    fn single_substitution() {
        assert_eq!(edit_distance("cay", "çay", None), 1);
        assert_eq!(edit_distance("kitten", "sitting", None), 3);
        assert_eq!(edit_distance("", "abc", None), 3);
        assert_eq!(edit_distance("abc", "", None), 3);
    }

    #[test]
    fn identity_and_symmetry() {
        for a in WORDS {
            assert_eq!(edit_distance(a, a, None), 0);
            for b in WORDS {
                assert_eq!(edit_distance(a, b, None), edit_distance(b, a, None), "{} / {}", a, b);
            }
        }
    }

    #[test]
    fn bounded_results_are_exact_within_bound() {
        for a in WORDS {
            for b in WORDS {
                let exact = edit_distance(a, b, None);
                for max in 0..4 {
                    let bounded = edit_distance(a, b, Some(max));
                    if exact <= max {
                        assert_eq!(bounded, exact, "{} / {} max {}", a, b, max);
                    } else {
                        assert!(bounded > max, "{} / {} max {}", a, b, max);
                    }
                }
            }
        }
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(edit_distance("şərbət", "serbet", None), 3);
        assert_eq!(edit_distance("azrbaycan", "azərbaycan", None), 1);
    }

    #[test]
    fn weighted_without_overrides_matches_unit_cost() {
        let table = WeightTable::new();
        for a in WORDS {
            for b in WORDS {
                assert_eq!(
                    weighted_distance(a, b, &table, None),
                    edit_distance(a, b, None) as Weight
                );
            }
        }
    }

    #[test]
    fn weighted_uses_ordered_pairs() {
        let mut table = WeightTable::new();
        table.insert('c', 'ç', 0.25).unwrap();

        assert_eq!(weighted_distance("cay", "çay", &table, None), 0.25);
        assert_eq!(weighted_distance("çay", "cay", &table, None), 1.0);
        // Orientation survives the internal swap to the shorter row.
        assert_eq!(weighted_distance("c", "çay", &table, None), 2.25);
        assert_eq!(weighted_distance("cay", "ç", &table, None), 2.25);
    }

    #[test]
    fn weighted_early_exit() {
        let table = WeightTable::new();
        assert!(weighted_distance("abcdef", "a", &table, Some(2.0)) > 2.0);
        assert_eq!(weighted_distance("abc", "abd", &table, Some(1.0)), 1.0);
    }
}
