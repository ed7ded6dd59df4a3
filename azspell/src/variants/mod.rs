//! Respellings of a query under common Azerbaijani typing confusions.
//!
//! The query is split into units (see [`SubstitutionTable::units`]) and a
//! bounded beam search substitutes units by their alternatives. Each
//! substitution counts as one edit, so `chay` -> `çay` is a single edit.
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub mod table;

pub use self::table::{SubstitutionTable, AZERBAIJANI};

/// A respelling of the query and the number of units substituted to get it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    /// the respelled word
    pub value: SmolStr,
    /// substituted unit count
    pub edits: usize,
}

impl Variant {
    /// creates a variant
    pub fn new<S: Into<SmolStr>>(value: S, edits: usize) -> Variant {
        Variant {
            value: value.into(),
            edits,
        }
    }

    /// gets the respelled word
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Generates variants of `query` using the Azerbaijani table.
pub fn generate(query: &str, max_edits: usize, max_candidates: usize) -> Vec<Variant> {
    generate_with_table(&AZERBAIJANI, query, max_edits, max_candidates)
}

/// Generates variants of `query` with at most `max_edits` substituted units,
/// keeping at most `max_candidates` partial respellings per step.
///
/// The result is sorted by `(edits, value)` and always starts with the
/// unchanged query when `max_candidates > 0`.
pub fn generate_with_table(
    table: &SubstitutionTable,
    query: &str,
    max_edits: usize,
    max_candidates: usize,
) -> Vec<Variant> {
    if query.is_empty() {
        return vec![Variant::new("", 0)];
    }

    let mut beam: Vec<(String, usize)> = vec![(String::new(), 0)];

    for unit in table.units(query) {
        let options = std::iter::once((unit.as_str(), 0)).chain(
            table
                .alternatives(&unit)
                .iter()
                .filter(|alt| **alt != unit.as_str())
                .map(|alt| (*alt, 1)),
        );
        let options = options.collect::<Vec<_>>();

        let mut expanded = Vec::with_capacity(beam.len() * options.len());
        for (prefix, edits) in beam.iter() {
            for (option, cost) in options.iter() {
                let edits = edits + cost;
                if edits > max_edits {
                    continue;
                }
                let mut value = String::with_capacity(prefix.len() + option.len());
                value.push_str(prefix);
                value.push_str(option);
                expanded.push((value, edits));
            }
        }

        // Sorting first keeps the kept prefix independent of expansion order.
        expanded.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        expanded.truncate(max_candidates);
        beam = expanded;

        if beam.is_empty() {
            log::trace!("Variant beam for {:?} emptied at unit {:?}", query, unit);
            break;
        }
    }

    // Sorted by edits, so the first occurrence of each value is its cheapest.
    beam.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    beam.into_iter()
        .unique_by(|(value, _)| value.clone())
        .map(|(value, edits)| Variant::new(value, edits))
        .collect()
}
