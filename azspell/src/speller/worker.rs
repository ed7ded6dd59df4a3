use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use smol_str::SmolStr;

use super::error::SuggestError;
use super::matcher::find_candidates;
use super::suggestion::{ProbedVariant, ScoredCandidate, Suggestion, Trace};
use super::SpellerConfig;
use crate::distance::{edit_distance, WeightTable};
use crate::tokenizer::case_handling::{lower_case, CaseMutation};
use crate::variants::{self, Variant};
use crate::vocab::Vocabulary;

/// Extra slack on the tie-break distance recomputed for every match.
const RELAXED_BOUND: usize = 2;

/// Ranks vocabulary tokens as corrections for `word`.
///
/// The word is lowercased, expanded into respellings and every respelling is
/// matched against `vocabulary`. Matches are merged per token and the best
/// `config.n_best` are returned.
pub fn suggest(
    word: &str,
    vocabulary: &Vocabulary,
    config: &SpellerConfig,
    weights: Option<&WeightTable>,
) -> Result<Vec<Suggestion>, SuggestError> {
    suggest_with_trace(word, vocabulary, config, weights).map(|(suggestions, _)| suggestions)
}

/// Same as [`suggest`], also returning which variants were probed.
///
/// With `config.case_handling` the casing of `word` (all caps or first
/// capital) is re-applied to the returned values.
pub fn suggest_with_trace(
    word: &str,
    vocabulary: &Vocabulary,
    config: &SpellerConfig,
    weights: Option<&WeightTable>,
) -> Result<(Vec<Suggestion>, Trace), SuggestError> {
    config.validate()?;

    let worker = SpellerWorker::new(vocabulary, config, weights);
    let (candidates, trace) = worker.rank(&lower_case(word));
    let mut suggestions = candidates
        .into_iter()
        .map(ScoredCandidate::into_suggestion)
        .collect::<Vec<_>>();

    if config.case_handling {
        let mutation = CaseMutation::of(word);
        suggestions
            .iter_mut()
            .for_each(|x| x.value = mutation.apply(x.value()));
    }

    Ok((suggestions, trace))
}

pub(crate) struct SpellerWorker<'a> {
    vocabulary: &'a Vocabulary,
    config: &'a SpellerConfig,
    weights: Option<&'a WeightTable>,
}

impl<'a> SpellerWorker<'a> {
    pub(crate) fn new(
        vocabulary: &'a Vocabulary,
        config: &'a SpellerConfig,
        weights: Option<&'a WeightTable>,
    ) -> SpellerWorker<'a> {
        SpellerWorker {
            vocabulary,
            config,
            weights,
        }
    }

    /// Identity first, then the generated respellings in generator order.
    fn variants(&self, query: &SmolStr) -> Vec<Variant> {
        let generated = variants::generate(
            query,
            self.config.max_variant_edits,
            self.config.max_variant_candidates,
        );

        std::iter::once(Variant::new(query.clone(), 0))
            .chain(generated.into_iter().filter(|v| &v.value != query))
            .collect()
    }

    pub(crate) fn rank(&self, query: &SmolStr) -> (Vec<ScoredCandidate>, Trace) {
        let mut trace = Trace {
            query: query.clone(),
            max_edits: self.config.max_variant_edits,
            max_candidates: self.config.max_variant_candidates,
            checked: vec![],
        };

        if query.is_empty() || self.vocabulary.is_empty() {
            return (vec![], trace);
        }

        let mut best: HashMap<SmolStr, ScoredCandidate> = HashMap::new();

        for variant in self.variants(query) {
            let matches = find_candidates(
                variant.value(),
                self.vocabulary,
                self.config.max_distance,
                self.config.n_best,
                self.weights,
            );

            log::trace!(
                "Variant {:?} ({} edits): {} matches",
                variant.value(),
                variant.edits,
                matches.len()
            );
            trace.checked.push(ProbedVariant {
                variant: variant.value.clone(),
                edits: variant.edits,
                matches: matches.len(),
            });

            for suggestion in matches {
                let distance = edit_distance(
                    variant.value(),
                    suggestion.value(),
                    Some(self.config.max_distance + RELAXED_BOUND),
                );
                let candidate =
                    ScoredCandidate::new(suggestion.value, suggestion.freq, variant.edits, distance);

                // For one token only distance and edits can differ.
                match best.entry(candidate.token.clone()) {
                    Entry::Occupied(mut entry) => {
                        if candidate < *entry.get() {
                            entry.insert(candidate);
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(candidate);
                    }
                }
            }
        }

        let mut ranked = best.into_iter().map(|(_, c)| c).collect::<Vec<_>>();
        ranked.sort();
        ranked.truncate(self.config.n_best);

        log::debug!(
            "{:?}: {} variants probed, {} suggestions",
            query,
            trace.checked.len(),
            ranked.len()
        );

        (ranked, trace)
    }
}
