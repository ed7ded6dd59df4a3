//! Corpus-derived vocabulary: token -> frequency.
//!
//! A [`Vocabulary`] is built once (from raw token counts, a corpus, or a saved
//! `token<TAB>frequency` file) and then only read, so it can be shared across
//! threads behind an `Arc`.
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use hashbrown::HashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use unic_ucd_category::GeneralCategory;

use crate::tokenizer::case_handling::upper_ratio;
use crate::tokenizer::tokenize;
use crate::types::Frequency;

pub mod cache;
pub mod error;

use self::error::VocabularyError;

/// Filtering applied when turning raw token counts into a vocabulary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// tokens seen fewer times are dropped
    pub min_frequency: Frequency,
    /// tokens seen more times are dropped, when set
    pub max_frequency: Option<Frequency>,
    /// tokens with fewer characters are dropped
    pub min_length: usize,
    /// tokens with a larger share of uppercase letters (acronyms, names) are
    /// dropped
    pub max_upper_ratio: f32,
    /// whether corpus text is lowercased before counting
    pub lowercase: bool,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        VocabularyConfig {
            min_frequency: 2,
            max_frequency: None,
            min_length: 3,
            max_upper_ratio: 0.6,
            lowercase: true,
        }
    }
}

impl VocabularyConfig {
    /// Whether a token seen `count` times passes this filter.
    pub fn accepts(&self, token: &str, count: Frequency) -> bool {
        if count < self.min_frequency || count == 0 {
            return false;
        }

        if self.max_frequency.map_or(false, |max| count > max) {
            return false;
        }

        if token.chars().count() < self.min_length {
            return false;
        }

        if !token.chars().all(|ch| GeneralCategory::of(ch).is_letter()) {
            return false;
        }

        upper_ratio(token) <= self.max_upper_ratio
    }
}

/// Read-only token -> frequency mapping used as the correction dictionary.
///
/// Entries are kept sorted by token so that iteration order does not depend
/// on hashing.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<(SmolStr, Frequency)>,
    index: HashMap<SmolStr, usize>,
}

impl Vocabulary {
    fn from_sorted(entries: Vec<(SmolStr, Frequency)>) -> Vocabulary {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (token, _))| (token.clone(), i))
            .collect();

        Vocabulary { entries, index }
    }

    /// Builds a vocabulary from explicit entries without any filtering.
    pub fn from_entries<I, S>(entries: I) -> Result<Vocabulary, VocabularyError>
    where
        I: IntoIterator<Item = (S, Frequency)>,
        S: Into<SmolStr>,
    {
        let mut entries = entries
            .into_iter()
            .map(|(token, freq)| (token.into(), freq))
            .collect::<Vec<(SmolStr, Frequency)>>();

        if let Some((token, _)) = entries.iter().find(|(_, freq)| *freq == 0) {
            return Err(VocabularyError::ZeroFrequency(token.clone()));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(VocabularyError::DuplicateToken(pair[0].0.clone()));
        }

        Ok(Vocabulary::from_sorted(entries))
    }

    /// Keeps the counted tokens accepted by `config`.
    pub fn from_counts(counts: &HashMap<SmolStr, Frequency>, config: &VocabularyConfig) -> Vocabulary {
        let mut entries = counts
            .iter()
            .filter(|(token, count)| config.accepts(token, **count))
            .map(|(token, count)| (token.clone(), *count))
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        log::debug!(
            "Vocabulary filter kept {} of {} token types",
            entries.len(),
            counts.len()
        );

        Vocabulary::from_sorted(entries)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frequency of `token`, if known.
    pub fn get(&self, token: &str) -> Option<Frequency> {
        self.index.get(token).map(|i| self.entries[*i].1)
    }

    /// Whether `token` is in the vocabulary.
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// All entries, ordered by token.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Frequency)> + '_ {
        self.entries.iter().map(|(token, freq)| (token.as_str(), *freq))
    }

    /// Distinct lowercased tokens of `text` that this vocabulary lacks, in
    /// order of first appearance. Tokens without letters are skipped.
    pub fn out_of_vocabulary(&self, text: &str) -> Vec<SmolStr> {
        tokenize(text, true)
            .into_iter()
            .filter(|token| token.chars().any(|ch| GeneralCategory::of(ch).is_letter()))
            .filter(|token| !self.contains(token))
            .unique()
            .collect()
    }

    /// Entries ordered by frequency (descending), then token.
    pub fn most_common(&self) -> Vec<(&str, Frequency)> {
        let mut entries = self.iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Reads `token<TAB>frequency` lines without filtering. A line holding
    /// only a token counts as frequency 1, repeated tokens are summed and
    /// lines starting with `#` are comments.
    pub fn read_tsv<R: Read>(reader: R) -> Result<Vocabulary, VocabularyError> {
        Vocabulary::from_entries(read_counts_tsv(reader)?)
    }

    /// Reads a `token<TAB>frequency` file as is, without filtering.
    pub fn load_tsv<P: AsRef<Path>>(path: P) -> Result<Vocabulary, VocabularyError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        Vocabulary::read_tsv(file)
    }

    /// Writes `token<TAB>frequency` lines, most common first.
    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<(), VocabularyError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(writer);

        for (token, freq) in self.most_common() {
            writer.write_record(&[token, freq.to_string().as_str()])?;
        }
        writer.flush().map_err(|e| VocabularyError::Io("<writer>".to_string(), e))?;
        Ok(())
    }

    /// Saves the vocabulary as a `token<TAB>frequency` file.
    pub fn save_tsv<P: AsRef<Path>>(&self, path: P) -> Result<(), VocabularyError> {
        let path = path.as_ref();
        let file = create_file(path)?;
        self.write_tsv(file)
    }
}

/// Reads raw `token<TAB>count` lines into a count map, summing repeats.
pub fn read_counts_tsv<R: Read>(reader: R) -> Result<HashMap<SmolStr, Frequency>, VocabularyError> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut counts: HashMap<SmolStr, Frequency> = HashMap::new();

    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let token = match record.get(0).map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => {
                log::warn!("Skipping empty vocabulary line {}", line);
                continue;
            }
        };

        let freq = match record.get(1).map(str::trim) {
            None | Some("") => 1,
            Some(value) => value
                .parse::<Frequency>()
                .ok()
                .filter(|freq| *freq > 0)
                .ok_or_else(|| VocabularyError::InvalidFrequency {
                    line,
                    value: value.to_string(),
                })?,
        };

        *counts.entry(SmolStr::from(token)).or_insert(0) += freq;
    }

    Ok(counts)
}

/// Counts tokens over all `texts`.
pub fn count_tokens<I, S>(texts: I, lowercase: bool) -> HashMap<SmolStr, Frequency>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<SmolStr, Frequency> = HashMap::new();

    for text in texts {
        for token in tokenize(text.as_ref(), lowercase) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    counts
}

/// Reads the `text` column of a corpus CSV. Empty cells read as empty text.
pub fn read_corpus_csv<P: AsRef<Path>>(path: P) -> Result<Vec<String>, VocabularyError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let column = rdr
        .headers()?
        .iter()
        .position(|h| h.trim() == "text")
        .ok_or_else(|| VocabularyError::MissingTextColumn(path.to_string_lossy().to_string()))?;

    let mut texts = vec![];
    for record in rdr.records() {
        let record = record?;
        texts.push(record.get(column).unwrap_or("").to_string());
    }

    log::debug!("Read {} documents from {}", texts.len(), path.display());
    Ok(texts)
}

/// Outcome of a vocabulary build, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSummary {
    /// distinct tokens counted in the corpus
    pub tokens_before_filter: usize,
    /// distinct tokens kept
    pub tokens_after_filter: usize,
    /// filter used
    #[serde(flatten)]
    pub config: VocabularyConfig,
}

impl BuildSummary {
    /// Writes the summary as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), VocabularyError> {
        let path = path.as_ref();
        let file = create_file(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Builds a vocabulary from a source file, picking the reader by extension:
/// `.csv` is a corpus with a `text` column, `.tsv` a saved vocabulary (token
/// counts), anything else plain text. The filter applies in every case.
pub fn build_from_path<P: AsRef<Path>>(
    path: P,
    config: &VocabularyConfig,
) -> Result<(Vocabulary, BuildSummary), VocabularyError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());

    let counts = match extension.as_deref() {
        Some("csv") => count_tokens(read_corpus_csv(path)?, config.lowercase),
        Some("tsv") => {
            let file = File::open(path).map_err(|e| io_error(path, e))?;
            read_counts_tsv(file)?
        }
        _ => {
            let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
            count_tokens(std::iter::once(text), config.lowercase)
        }
    };

    let vocabulary = Vocabulary::from_counts(&counts, config);
    let summary = BuildSummary {
        tokens_before_filter: counts.len(),
        tokens_after_filter: vocabulary.len(),
        config: config.clone(),
    };

    log::info!(
        "Built vocabulary of {} tokens from {} ({} before filtering)",
        summary.tokens_after_filter,
        path.display(),
        summary.tokens_before_filter
    );

    Ok((vocabulary, summary))
}

fn io_error(path: &Path, error: std::io::Error) -> VocabularyError {
    VocabularyError::Io(path.to_string_lossy().to_string(), error)
}

fn create_file(path: &Path) -> Result<File, VocabularyError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    File::create(path).map_err(|e| io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn counts(pairs: &[(&str, Frequency)]) -> HashMap<SmolStr, Frequency> {
        pairs.iter().map(|(t, c)| (SmolStr::from(*t), *c)).collect()
    }

    #[test]
    fn filter_rules() {
        let config = VocabularyConfig::default();
        let vocabulary = Vocabulary::from_counts(
            &counts(&[
                ("kitab", 5),
                ("az", 9),
                ("nadir", 1),
                ("2020", 7),
                ("bir-iki", 4),
                ("NATO", 6),
                ("Bakı", 3),
            ]),
            &config,
        );

        assert_eq!(vocabulary.iter().collect::<Vec<_>>(), vec![("Bakı", 3), ("kitab", 5)]);
    }

    #[test]
    fn max_frequency_cap() {
        let config = VocabularyConfig {
            max_frequency: Some(100),
            ..VocabularyConfig::default()
        };
        assert!(config.accepts("kitab", 100));
        assert!(!config.accepts("və", 5000));
        assert!(!config.accepts("bir", 101));
        assert!(VocabularyConfig::default().accepts("bir", 101));

        let vocabulary = Vocabulary::from_counts(&counts(&[("bir", 500), ("kitab", 5)]), &config);
        assert_eq!(vocabulary.iter().collect::<Vec<_>>(), vec![("kitab", 5)]);

        let parsed: VocabularyConfig = serde_json::from_str(r#"{"max_frequency": 100}"#).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn out_of_vocabulary_tokens() {
        let vocabulary = Vocabulary::from_entries(vec![("çay", 10), ("içdik", 2)]).unwrap();
        let unknown = vocabulary.out_of_vocabulary("Çay içdik, cay icdik. Sonra cay 2020-ci il!");
        let unknown = unknown.iter().map(|t| t.as_str()).collect::<Vec<_>>();
        assert_eq!(unknown, vec!["cay", "icdik", "sonra", "ci", "il"]);
    }

    #[test]
    fn entries_are_unique_and_positive() {
        assert!(matches!(
            Vocabulary::from_entries(vec![("çay", 1), ("çay", 2)]),
            Err(VocabularyError::DuplicateToken(_))
        ));
        assert!(matches!(
            Vocabulary::from_entries(vec![("çay", 0)]),
            Err(VocabularyError::ZeroFrequency(_))
        ));

        let vocabulary = Vocabulary::from_entries(vec![("şərbət", 8), ("çay", 10)]).unwrap();
        assert_eq!(vocabulary.len(), 2);
        assert_eq!(vocabulary.get("çay"), Some(10));
        assert!(vocabulary.contains("şərbət"));
        assert!(!vocabulary.contains("cay"));
        assert_eq!(vocabulary.iter().map(|(t, _)| t).collect::<Vec<_>>(), vec!["çay", "şərbət"]);
    }

    #[test]
    fn counts_corpus_tokens() {
        let counts = count_tokens(vec!["Çay və çay.", "Kitab və"], true);
        assert_eq!(counts.get("çay"), Some(&2));
        assert_eq!(counts.get("və"), Some(&2));
        assert_eq!(counts.get("kitab"), Some(&1));
    }

    #[test]
    fn tsv_round_trip() {
        let vocabulary =
            Vocabulary::from_entries(vec![("kitab", 3), ("azərbaycan", 10), ("çay", 3)]).unwrap();
        let mut buffer = vec![];
        vocabulary.write_tsv(&mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert_eq!(text, "azərbaycan\t10\nkitab\t3\nçay\t3\n");

        let loaded = Vocabulary::read_tsv(&buffer[..]).unwrap();
        assert_eq!(loaded.iter().collect::<Vec<_>>(), vocabulary.iter().collect::<Vec<_>>());
    }

    #[test]
    fn tsv_lenient_lines() {
        let input = "# comment\nçay\t4\nşərbət\n\nçay\t1\n";
        let counts = read_counts_tsv(input.as_bytes()).unwrap();
        assert_eq!(counts.get("çay"), Some(&5));
        assert_eq!(counts.get("şərbət"), Some(&1));

        assert!(matches!(
            read_counts_tsv("çay\tmany\n".as_bytes()),
            Err(VocabularyError::InvalidFrequency { line: 1, .. })
        ));
        assert!(matches!(
            read_counts_tsv("çay\t0\n".as_bytes()),
            Err(VocabularyError::InvalidFrequency { .. })
        ));
    }

    #[test]
    fn builds_from_corpus_csv() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus.csv");
        let mut file = File::create(&corpus).unwrap();
        writeln!(file, "page_id,title,text").unwrap();
        writeln!(file, "1,Çay,\"Çay içdik. Çay isti idi.\"").unwrap();
        writeln!(file, "2,Boş,").unwrap();
        writeln!(file, "3,Kitab,\"Kitab oxuduq, çay içdik.\"").unwrap();
        drop(file);

        let (vocabulary, summary) = build_from_path(&corpus, &VocabularyConfig::default()).unwrap();
        assert_eq!(
            vocabulary.most_common(),
            vec![("çay", 3), ("içdik", 2)]
        );
        assert_eq!(summary.tokens_after_filter, 2);
        assert_eq!(summary.tokens_before_filter, 6);

        let summary_path = dir.path().join("stats").join("summary.json");
        summary.save(&summary_path).unwrap();
        let saved: BuildSummary =
            serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(saved, summary);
    }

    #[test]
    fn missing_text_column() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus.csv");
        std::fs::write(&corpus, "title,body\na,b\n").unwrap();
        assert!(matches!(
            read_corpus_csv(&corpus),
            Err(VocabularyError::MissingTextColumn(_))
        ));
    }

    #[test]
    fn saves_and_loads_tsv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.tsv");
        let vocabulary = Vocabulary::from_entries(vec![("çay", 10), ("cay", 1)]).unwrap();
        vocabulary.save_tsv(&path).unwrap();

        let loaded = Vocabulary::load_tsv(&path).unwrap();
        assert_eq!(loaded.get("cay"), Some(1));
        assert_eq!(loaded.get("çay"), Some(10));
    }
}
