//! Word tokenization for corpus text.
use lazy_static::lazy_static;
use regex::{Matches, Regex};
use smol_str::SmolStr;

pub mod case_handling;
pub mod sentence;

lazy_static! {
    // Letter runs joined by internal apostrophes/hyphens, or numbers with
    // decimal separators.
    static ref WORD_RE: Regex =
        Regex::new(r"\p{L}+(?:['’\-]\p{L}+)*|\p{N}+(?:[.,]\p{N}+)*").unwrap();
    static ref GARBAGE_LINE_RE: Regex =
        Regex::new(r"(?im)^\s*(?:kateqoriya|[iİ]stinadlar|qeydlər|əlavə ədəbiyyat)\b.*$").unwrap();
    static ref GARBAGE_MARKER_RE: Regex =
        Regex::new(r"(?i)\b(?:kateqoriya|[iİ]stinadlar|qeydlər|əlavə ədəbiyyat)\b\s*:\s*").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Splits text into word tokens.
pub trait Tokenize {
    /// Word tokens with their byte offsets.
    fn word_indices(&self) -> WordIndices<'_>;
    /// Word tokens.
    fn words(&self) -> Words<'_>;
}

impl Tokenize for str {
    fn word_indices(&self) -> WordIndices<'_> {
        WordIndices {
            inner: WORD_RE.find_iter(self),
        }
    }

    fn words(&self) -> Words<'_> {
        Words {
            inner: self.word_indices(),
        }
    }
}

/// Iterator over `(byte offset, token)` pairs.
pub struct WordIndices<'a> {
    inner: Matches<'static, 'a>,
}

impl<'a> Iterator for WordIndices<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|m| (m.start(), m.as_str()))
    }
}

/// Iterator over tokens.
pub struct Words<'a> {
    inner: WordIndices<'a>,
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, word)| word)
    }
}

/// Unifies Wikipedia-style punctuation variants and collapses whitespace.
pub fn normalize_text(text: &str) -> String {
    let text: String = text
        .chars()
        .map(|ch| match ch {
            '\u{00A0}' => ' ',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{2013}' | '\u{2014}' => '-',
            ch => ch,
        })
        .collect();

    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Removes category/reference navigation lines left over from Wikipedia
/// pages, and inline `Kateqoriya:`-style markers.
pub fn strip_wiki_garbage(text: &str) -> String {
    let text = GARBAGE_LINE_RE.replace_all(text, " ");
    GARBAGE_MARKER_RE.replace_all(&text, " ").into_owned()
}

/// Cleans `text` and returns its word tokens, lowercased if requested.
///
/// Garbage lines are stripped before whitespace is collapsed, as line
/// structure is lost afterwards.
pub fn tokenize(text: &str, lowercase: bool) -> Vec<SmolStr> {
    let text = normalize_text(&strip_wiki_garbage(text));
    let text = if lowercase {
        case_handling::lower_case(&text).to_string()
    } else {
        text
    };

    text.words().map(SmolStr::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str, lowercase: bool) -> Vec<String> {
        tokenize(text, lowercase).into_iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn basic() {
        assert_eq!(
            tokens("Bakı Azərbaycanın paytaxtıdır.", true),
            vec!["bakı", "azərbaycanın", "paytaxtıdır"]
        );
        assert_eq!(
            tokens("Bakı Azərbaycanın paytaxtıdır.", false),
            vec!["Bakı", "Azərbaycanın", "paytaxtıdır"]
        );
    }

    #[test]
    fn joined_words_and_numbers() {
        assert_eq!(
            tokens("Şimal-qərb, Ali’nin 3.14 və 2,5 — 1990-cı il", true),
            vec!["şimal-qərb", "ali'nin", "3.14", "və", "2,5", "1990", "cı", "il"]
        );
    }

    #[test]
    fn word_indices() {
        let msg = "Salam, dünya! 42 dəfə";
        assert_eq!(
            msg.word_indices().collect::<Vec<_>>(),
            vec![(0, "Salam"), (7, "dünya"), (15, "42"), (18, "dəfə")]
        );
        assert_eq!(msg.words().count(), 4);
    }

    #[test]
    fn normalize() {
        assert_eq!(
            normalize_text("  a\u{00A0}b \n\t c\u{2014}d ‘e’ "),
            "a b c-d 'e'"
        );
    }

    #[test]
    fn strips_category_lines() {
        let text = "Birinci cümlə.\nKateqoriya: Şəhərlər\nİstinadlar\nSon söz Qeydlər: yox";
        assert_eq!(tokens(text, true), vec!["birinci", "cümlə", "son", "söz", "yox"]);
    }

    #[test]
    fn dotted_capital_i() {
        assert_eq!(tokens("İlham", true), vec!["ilham"]);
    }
}
