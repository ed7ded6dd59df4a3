use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use gumdrop::Options;
use serde::Serialize;

use azspell::distance::WeightTable;
use azspell::speller::suggestion::{Suggestion, Trace};
use azspell::speller::{Speller, SpellerConfig, VocabSpeller};
use azspell::tokenizer::sentence::{evaluate, segment};
use azspell::tokenizer::{tokenize, Tokenize};
use azspell::vocab::cache::{VocabularyCache, VocabularyKey};
use azspell::vocab::{build_from_path, Vocabulary, VocabularyConfig};

trait OutputWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool);
    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]);
    fn write_trace(&mut self, word: &str, trace: &Trace);
    fn finish(&mut self);
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        println!(
            "Input: {}\t\t[{}]",
            &word,
            if is_correct { "CORRECT" } else { "INCORRECT" }
        );
    }

    fn write_suggestions(&mut self, _word: &str, suggestions: &[Suggestion]) {
        for sugg in suggestions {
            println!("{}\t{}", sugg.value, sugg.freq);
        }
        println!();
    }

    fn write_trace(&mut self, _word: &str, trace: &Trace) {
        println!(
            "# variants of {:?} (max edits {}, beam {})",
            trace.query, trace.max_edits, trace.max_candidates
        );
        for probe in &trace.checked {
            println!("#   {}\t{}\t{}", probe.variant, probe.edits, probe.matches);
        }
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionRequest {
    word: String,
    is_correct: bool,
    suggestions: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Trace>,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<SuggestionRequest>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }

    fn last(&mut self, word: &str) -> &mut SuggestionRequest {
        if self.results.last().map(|x| x.word != word).unwrap_or(true) {
            self.write_correction(word, false);
        }
        let i = self.results.len() - 1;
        &mut self.results[i]
    }
}

impl OutputWriter for JsonWriter {
    fn write_correction(&mut self, word: &str, is_correct: bool) {
        self.results.push(SuggestionRequest {
            word: word.to_owned(),
            is_correct,
            suggestions: vec![],
            trace: None,
        });
    }

    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]) {
        self.last(word).suggestions = suggestions.to_vec();
    }

    fn write_trace(&mut self, word: &str, trace: &Trace) {
        self.last(word).trace = Some(trace.clone());
    }

    fn finish(&mut self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize results: {}", e),
        }
    }
}

fn run(
    speller: Arc<dyn Speller + Send + Sync>,
    words: Vec<String>,
    writer: &mut dyn OutputWriter,
    is_always_suggesting: bool,
    is_tracing: bool,
    suggest_cfg: &SpellerConfig,
) -> anyhow::Result<()> {
    for word in words {
        let is_correct = speller.clone().is_correct(&word);
        writer.write_correction(&word, is_correct);

        if is_always_suggesting || !is_correct {
            if is_tracing {
                let (suggestions, trace) = speller.clone().suggest_with_trace(&word, suggest_cfg)?;
                writer.write_suggestions(&word, &suggestions);
                writer.write_trace(&word, &trace);
            } else {
                let suggestions = speller.clone().suggest_with_config(&word, suggest_cfg)?;
                writer.write_suggestions(&word, &suggestions);
            }
        }
    }

    Ok(())
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "get suggestions for provided input")]
    Suggest(SuggestArgs),

    #[options(help = "print input in word-separated tokenized form")]
    Tokenize(TokenizeArgs),

    #[options(help = "build a vocabulary file from a corpus")]
    Vocab(VocabArgs),

    #[options(help = "split input into sentences")]
    Sentences(SentencesArgs),
}

#[derive(Debug, Options)]
struct SuggestArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "vocabulary file (token<TAB>frequency) to be used")]
    vocab: Option<PathBuf>,

    #[options(help = "corpus (CSV with a `text` column, or plain text) to build the vocabulary from")]
    corpus: Option<PathBuf>,

    #[options(no_short, help = "JSON file of substitution weights")]
    confusion: Option<PathBuf>,

    #[options(short = "d", help = "maximum edit distance of suggestions")]
    max_distance: Option<usize>,

    #[options(help = "maximum number of results")]
    nbest: Option<usize>,

    #[options(no_short, help = "maximum substitutions in a respelling")]
    variant_edits: Option<usize>,

    #[options(no_short, help = "maximum respellings kept per step")]
    variant_candidates: Option<usize>,

    #[options(no_short, help = "minimum token frequency when building from a corpus")]
    min_freq: Option<u64>,

    #[options(no_short, help = "maximum token frequency when building from a corpus")]
    max_freq: Option<u64>,

    #[options(no_short, help = "minimum token length when building from a corpus")]
    min_len: Option<usize>,

    #[options(no_short, help = "maximum share of uppercase letters in a token")]
    max_upper_ratio: Option<f32>,

    #[options(short = "S", help = "always show suggestions even if word is correct")]
    always_suggest: bool,

    #[options(
        no_short,
        long = "case-handling",
        help = "give suggestions the casing of the input word"
    )]
    case_handling: bool,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(no_short, help = "show the respellings that were tried")]
    trace: bool,

    #[options(no_short, help = "check every unknown word of a text file")]
    text: Option<PathBuf>,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct TokenizeArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(short = "w", long = "words", help = "show raw words with their offsets")]
    is_words_only: bool,

    #[options(help = "lowercase the tokens")]
    lowercase: bool,

    #[options(free, help = "text to be tokenized")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct VocabArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "corpus (CSV with a `text` column, or plain text)", required)]
    corpus: PathBuf,

    #[options(help = "vocabulary file to write", required)]
    output: PathBuf,

    #[options(help = "JSON file to write the build summary to")]
    summary: Option<PathBuf>,

    #[options(no_short, help = "minimum token frequency")]
    min_freq: Option<u64>,

    #[options(no_short, help = "maximum token frequency, drops very common tokens")]
    max_freq: Option<u64>,

    #[options(no_short, help = "minimum token length")]
    min_len: Option<usize>,

    #[options(no_short, help = "maximum share of uppercase letters in a token")]
    max_upper_ratio: Option<f32>,

    #[options(no_short, help = "keep the original casing of tokens")]
    keep_case: bool,
}

#[derive(Debug, Options)]
struct SentencesArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "file with one expected sentence per line to score against")]
    gold: Option<PathBuf>,

    #[options(free, help = "text to be split")]
    inputs: Vec<String>,
}

fn read_stdin() -> anyhow::Result<String> {
    eprintln!("Reading from stdin...");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;
    Ok(buffer)
}

fn read_text(inputs: Vec<String>) -> anyhow::Result<String> {
    if inputs.is_empty() {
        read_stdin()
    } else {
        Ok(inputs.join(" "))
    }
}

fn vocabulary_config(
    min_freq: Option<u64>,
    max_freq: Option<u64>,
    min_len: Option<usize>,
    max_upper_ratio: Option<f32>,
) -> VocabularyConfig {
    let mut config = VocabularyConfig::default();

    if let Some(v) = min_freq {
        config.min_frequency = v;
    }

    if max_freq.is_some() {
        config.max_frequency = max_freq;
    }

    if let Some(v) = min_len {
        config.min_length = v;
    }

    if let Some(v) = max_upper_ratio {
        config.max_upper_ratio = v;
    }

    config
}

fn tokenize_command(args: TokenizeArgs) -> anyhow::Result<()> {
    let inputs = read_text(args.inputs)?;

    if args.is_words_only {
        for (index, token) in inputs.word_indices() {
            println!("{:>4}: \"{}\"", index, token);
        }
    } else {
        for token in tokenize(&inputs, args.lowercase) {
            println!("{}", token);
        }
    }

    Ok(())
}

fn load_vocabulary(
    args: &SuggestArgs,
    cache: &VocabularyCache,
) -> anyhow::Result<Arc<Vocabulary>> {
    match (&args.vocab, &args.corpus) {
        (Some(path), None) => {
            let vocabulary = Vocabulary::load_tsv(path)
                .with_context(|| format!("loading vocabulary {}", path.display()))?;
            Ok(Arc::new(vocabulary))
        }
        (None, Some(path)) => {
            let config = vocabulary_config(
                args.min_freq,
                args.max_freq,
                args.min_len,
                args.max_upper_ratio,
            );
            let key = VocabularyKey::new(path, config);
            cache
                .load(&key)
                .with_context(|| format!("building vocabulary from {}", path.display()))
        }
        _ => anyhow::bail!("exactly one of --vocab or --corpus is required"),
    }
}

fn suggest(args: SuggestArgs) -> anyhow::Result<()> {
    let mut suggest_cfg = SpellerConfig::default();

    if let Some(v) = args.max_distance {
        suggest_cfg.max_distance = v;
    }

    if let Some(v) = args.nbest {
        suggest_cfg.n_best = v;
    }

    if let Some(v) = args.variant_edits {
        suggest_cfg.max_variant_edits = v;
    }

    if let Some(v) = args.variant_candidates {
        suggest_cfg.max_variant_candidates = v;
    }

    suggest_cfg.case_handling = args.case_handling;
    suggest_cfg.validate()?;

    let cache = VocabularyCache::new();
    let vocabulary = load_vocabulary(&args, &cache)?;

    let weights = match args.confusion.as_ref() {
        Some(path) => {
            let (table, rejected) = WeightTable::load(path)
                .with_context(|| format!("loading confusion matrix {}", path.display()))?;
            if !rejected.is_empty() {
                log::warn!(
                    "{} entries of {} were ignored",
                    rejected.len(),
                    path.display()
                );
            }
            Some(Arc::new(table))
        }
        None => None,
    };

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };

    let words: Vec<String> = if let Some(path) = args.text.as_ref() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let unknown = vocabulary.out_of_vocabulary(&text);
        log::info!("{} unknown words in {}", unknown.len(), path.display());
        unknown.into_iter().map(|x| x.to_string()).collect()
    } else if args.inputs.is_empty() {
        read_stdin()?
            .lines()
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty())
            .collect()
    } else {
        args.inputs
    };

    let speller = VocabSpeller::new(vocabulary, weights);

    run(
        speller,
        words,
        &mut *writer,
        args.always_suggest,
        args.trace,
        &suggest_cfg,
    )?;

    writer.finish();

    Ok(())
}

fn vocab(args: VocabArgs) -> anyhow::Result<()> {
    let mut config = vocabulary_config(
        args.min_freq,
        args.max_freq,
        args.min_len,
        args.max_upper_ratio,
    );
    config.lowercase = !args.keep_case;

    let (vocabulary, summary) = build_from_path(&args.corpus, &config)
        .with_context(|| format!("building vocabulary from {}", args.corpus.display()))?;

    vocabulary
        .save_tsv(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    if let Some(path) = args.summary.as_ref() {
        summary
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    eprintln!(
        "Wrote {} tokens ({} before filtering) to {}",
        summary.tokens_after_filter,
        summary.tokens_before_filter,
        args.output.display()
    );

    Ok(())
}

fn sentences(args: SentencesArgs) -> anyhow::Result<()> {
    let text = read_text(args.inputs)?;
    let predicted = segment(&text);

    match args.gold.as_ref() {
        None => {
            for sentence in &predicted {
                println!("{}", sentence);
            }
        }
        Some(path) => {
            let gold = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?
                .lines()
                .map(|x| x.trim().to_string())
                .filter(|x| !x.is_empty())
                .collect::<Vec<_>>();
            let scores = evaluate(&predicted, &gold);
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Suggest(args)) => suggest(args),
        Some(Command::Tokenize(args)) => tokenize_command(args),
        Some(Command::Vocab(args)) => vocab(args),
        Some(Command::Sentences(args)) => sentences(args),
    }
}
