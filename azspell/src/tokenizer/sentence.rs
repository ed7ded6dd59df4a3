//! Rule-based sentence segmentation.
//!
//! A sentence ends at a run of `.`, `!` or `?` followed by a non-word
//! character, unless the word right before it is a known abbreviation, a
//! decimal number, or a chain of initials (`H.Ə.`).
use hashbrown::HashSet;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use smol_str::SmolStr;

use super::case_handling::lower_case;
use super::strip_wiki_garbage;

lazy_static! {
    static ref DECIMAL_RE: Regex = Regex::new(r"\d+[.,]\d+").unwrap();
    static ref INITIALS_RE: Regex = Regex::new(r"(?:\b\p{L}\.){2,}$").unwrap();
    static ref COLON_RUN_RE: Regex = Regex::new(r"\s*[;:]+\s*").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Abbreviations that do not end a sentence, compared without dots.
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "dr", "prof", "mr", "mrs", "ms", "t.k", "b.k", "q.k", "m", "s", "ş", "cən", "ünvan",
    "nömrə", "beyləqan", "azərbaycan", "akademiya", "şirkət", "futbolçu",
];

#[inline(always)]
fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// Splits text into sentences.
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    abbreviations: HashSet<SmolStr>,
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        SentenceSegmenter::with_abbreviations(DEFAULT_ABBREVIATIONS.iter().copied())
    }
}

impl SentenceSegmenter {
    /// Creates a segmenter that knows the given abbreviations.
    pub fn with_abbreviations<'a, I>(abbreviations: I) -> SentenceSegmenter
    where
        I: IntoIterator<Item = &'a str>,
    {
        SentenceSegmenter {
            abbreviations: abbreviations
                .into_iter()
                .map(|a| lower_case(a.trim_matches('.')))
                .collect(),
        }
    }

    fn is_abbreviation(&self, token: &str) -> bool {
        self.abbreviations
            .contains(&lower_case(token.trim_matches('.')))
    }

    fn keeps_going(&self, chunk: &str) -> bool {
        let previous = match chunk.split_whitespace().last() {
            Some(word) => word,
            None => return false,
        };

        self.is_abbreviation(previous)
            || DECIMAL_RE.is_match(previous)
            || INITIALS_RE.is_match(previous)
    }

    /// Splits `text` into trimmed, non-empty sentences.
    pub fn segment(&self, text: &str) -> Vec<String> {
        let text = strip_wiki_garbage(text);
        let text = COLON_RUN_RE.replace_all(&text, " ");
        let text = WHITESPACE_RE.replace_all(&text, " ");
        let text = text.trim();

        let mut sentences = vec![];
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            if !is_terminator(ch) {
                continue;
            }

            let mut end = i + ch.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !is_terminator(next) {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }

            // Glued to the next word, as in `3.5` or `az.wikipedia`.
            if text[end..].chars().next().map_or(false, char::is_alphanumeric) {
                continue;
            }

            let chunk = &text[start..end];
            if self.keeps_going(chunk) {
                continue;
            }

            let sentence = chunk.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
        }

        let rest = text[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }

        log::debug!("Segmented {} bytes into {} sentences", text.len(), sentences.len());
        sentences
    }
}

/// Splits `text` into sentences with the default abbreviation list.
pub fn segment(text: &str) -> Vec<String> {
    SentenceSegmenter::default().segment(text)
}

/// Set-based agreement between predicted and gold sentences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scores {
    /// share of predicted sentences found in gold
    pub precision: f64,
    /// share of gold sentences predicted
    pub recall: f64,
    /// harmonic mean of the two
    pub f1: f64,
}

/// Compares predicted sentences against a gold list.
pub fn evaluate<S: AsRef<str>>(predicted: &[S], gold: &[S]) -> Scores {
    let predicted: HashSet<&str> = predicted.iter().map(AsRef::as_ref).collect();
    let gold: HashSet<&str> = gold.iter().map(AsRef::as_ref).collect();

    let true_positives = predicted.intersection(&gold).count() as f64;
    let false_positives = predicted.difference(&gold).count() as f64;
    let false_negatives = gold.difference(&predicted).count() as f64;

    let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };
    let precision = ratio(true_positives, true_positives + false_positives);
    let recall = ratio(true_positives, true_positives + false_negatives);
    let f1 = ratio(2.0 * precision * recall, precision + recall);

    Scores {
        precision,
        recall,
        f1,
    }
}
