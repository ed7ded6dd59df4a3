use chrono::prelude::*;
use std::error::Error;
use std::sync::Arc;
use std::{
    io::Write,
    path::Path,
    time::{Instant, SystemTime},
};

use azspell::speller::suggestion::Suggestion;
use azspell::speller::{Speller, SpellerConfig, VocabSpeller};
use azspell::vocab::{build_from_path, Vocabulary, VocabularyConfig};
use distance::damerau_levenshtein;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use structopt::clap::{App, AppSettings, Arg};

fn load_words(
    path: &str,
    max_words: Option<usize>,
) -> Result<Vec<(String, String)>, Box<dyn Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_path(path)?;

    Ok(rdr
        .records()
        .filter_map(Result::ok)
        .filter_map(|r| {
            r.get(0)
                .and_then(|x| r.get(1).map(|y| (x.trim().to_string(), y.trim().to_string())))
        })
        .filter(|(input, expected)| !input.is_empty() && !expected.is_empty())
        .take(max_words.unwrap_or(std::usize::MAX))
        .collect())
}

/// A saved vocabulary is used as is, anything else is treated as a corpus.
fn load_vocabulary(path: &Path) -> Result<Vocabulary, Box<dyn Error>> {
    let is_tsv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false);

    if is_tsv {
        Ok(Vocabulary::load_tsv(path)?)
    } else {
        let (vocabulary, _) = build_from_path(path, &VocabularyConfig::default())?;
        Ok(vocabulary)
    }
}

#[derive(Debug, Default, Serialize, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
struct Time {
    secs: u64,
    subsec_nanos: u32,
}

impl Time {
    fn from_duration(duration: std::time::Duration) -> Time {
        Time {
            secs: duration.as_secs(),
            subsec_nanos: duration.subsec_nanos(),
        }
    }

    fn as_nanos(&self) -> u128 {
        self.secs as u128 * 1_000_000_000 + self.subsec_nanos as u128
    }

    fn from_nanos(nanos: u128) -> Time {
        Time {
            secs: (nanos / 1_000_000_000) as u64,
            subsec_nanos: (nanos % 1_000_000_000) as u32,
        }
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let ms = self.secs * 1000 + (self.subsec_nanos as u64 / 1_000_000);
        write!(f, "{}ms", ms)
    }
}

#[derive(Debug, Serialize)]
struct AccuracyResult<'a> {
    input: &'a str,
    expected: &'a str,
    distance: usize,
    suggestions: Vec<Suggestion>,
    position: Option<usize>,
    time: Time,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    vocabulary: &'a str,
    vocabulary_size: usize,
    config: &'a SpellerConfig,
    summary: Summary,
    results: Vec<AccuracyResult<'a>>,
    start_timestamp: Time,
    total_time: Time,
}

#[derive(Serialize, Default, Debug, Clone)]
struct Summary {
    total_words: u32,
    first_position: u32,
    top_five: u32,
    any_position: u32,
    no_suggestions: u32,
    only_wrong: u32,
    slowest_lookup: Time,
    fastest_lookup: Time,
    average_time: Time,
    average_time_95pc: Time,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let percent =
            |v: u32| -> String { format!("{:.2}%", v as f32 / self.total_words as f32 * 100f32) };

        write!(
            f,
            "[#1] {} [^5] {} [any] {} [none] {} [wrong] {} [fast] {} [slow] {} [avg] {}",
            percent(self.first_position),
            percent(self.top_five),
            percent(self.any_position),
            percent(self.no_suggestions),
            percent(self.only_wrong),
            self.fastest_lookup,
            self.slowest_lookup,
            self.average_time
        )
    }
}

impl Summary {
    fn new<'a>(results: &[AccuracyResult<'a>]) -> Summary {
        let mut summary = Summary::default();

        results.iter().for_each(|result| {
            summary.total_words += 1;

            if let Some(position) = result.position {
                summary.any_position += 1;

                if position == 0 {
                    summary.first_position += 1;
                }

                if position < 5 {
                    summary.top_five += 1;
                }
            } else if result.suggestions.is_empty() {
                summary.no_suggestions += 1;
            } else {
                summary.only_wrong += 1;
            }
        });

        let mut times = results.iter().map(|x| x.time).collect::<Vec<_>>();
        times.sort();

        if let (Some(fastest), Some(slowest)) = (times.first(), times.last()) {
            summary.fastest_lookup = *fastest;
            summary.slowest_lookup = *slowest;
            summary.average_time = average(&times);

            // Leave out the slowest 5% of lookups.
            let cutoff = ((times.len() as f64) * 0.95).ceil() as usize;
            summary.average_time_95pc = average(&times[..cutoff.max(1)]);
        }

        summary
    }
}

fn average(times: &[Time]) -> Time {
    if times.is_empty() {
        return Time::default();
    }
    let total: u128 = times.iter().map(Time::as_nanos).sum();
    Time::from_nanos(total / times.len() as u128)
}

fn git_output(args: &[&str]) -> Result<String, Box<dyn Error>> {
    let output = std::process::Command::new("git").args(args).output()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let matches = App::new("azspell-accuracy")
        .setting(AppSettings::ArgRequiredElseHelp)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Accuracy testing for azspell.")
        .arg(
            Arg::with_name("config")
                .short("c")
                .takes_value(true)
                .help("Provide JSON config file to override test defaults"),
        )
        .arg(
            Arg::with_name("words")
                .value_name("WORDS")
                .help("The 'input -> expected' list in tab-delimited value file (TSV)"),
        )
        .arg(
            Arg::with_name("vocab")
                .value_name("VOCAB")
                .help("Vocabulary TSV, or a corpus to build one from"),
        )
        .arg(
            Arg::with_name("json-output")
                .short("o")
                .value_name("JSON-OUTPUT")
                .help("The file path for the JSON report output"),
        )
        .arg(
            Arg::with_name("tsv-output")
                .short("t")
                .value_name("TSV-OUTPUT")
                .help("The file path for the TSV line append"),
        )
        .arg(
            Arg::with_name("max-words")
                .short("w")
                .takes_value(true)
                .help("Truncate typos list to max number of words specified"),
        )
        .get_matches();

    let cfg: SpellerConfig = match matches.value_of("config") {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            serde_json::from_reader(file)?
        }
        None => SpellerConfig::default(),
    };
    cfg.validate()?;

    let vocab_path = match matches.value_of("vocab") {
        Some(path) => path,
        None => {
            eprintln!("No vocabulary for given path; aborting.");
            std::process::exit(1);
        }
    };
    let vocabulary = Arc::new(load_vocabulary(Path::new(vocab_path))?);
    let vocabulary_size = vocabulary.len();
    let speller = VocabSpeller::new(vocabulary, None);

    let words = match matches.value_of("words") {
        Some(path) => load_words(
            path,
            matches
                .value_of("max-words")
                .and_then(|x| x.parse::<usize>().ok()),
        )?,
        None => {
            eprintln!("No word list for given path; aborting.");
            std::process::exit(1);
        }
    };

    let pb = ProgressBar::new(words.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{pos}/{len} [{percent}%] {wide_bar} {elapsed_precise}"),
    );

    let start_time = Instant::now();
    let results = words
        .par_iter()
        .progress_with(pb)
        .map(|(input, expected)| {
            let now = Instant::now();
            let suggestions = speller.clone().suggest_with_config(input, &cfg);
            let time = Time::from_duration(now.elapsed());

            suggestions.map(|suggestions| {
                let position = suggestions
                    .iter()
                    .position(|x| x.value() == expected.as_str());

                let distance = damerau_levenshtein(input, expected);
                AccuracyResult {
                    input,
                    expected,
                    distance,
                    time,
                    suggestions,
                    position,
                }
            })
        })
        .collect::<Result<Vec<_>, azspell::speller::SuggestError>>()?;

    let total_time = Time::from_duration(start_time.elapsed());
    let start_timestamp =
        Time::from_duration(SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?);

    let summary = Summary::new(&results);
    println!("{}", summary);

    if let Some(path) = matches.value_of("json-output") {
        let output = std::fs::File::create(path)?;
        let report = Report {
            vocabulary: vocab_path,
            vocabulary_size,
            config: &cfg,
            summary,
            results,
            start_timestamp,
            total_time,
        };
        println!("Writing JSON report…");
        serde_json::to_writer_pretty(output, &report)?;
    } else if let Some(path) = matches.value_of("tsv-output") {
        let mut output = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let md = output.metadata()?;
        if md.len() == 0 {
            // new file, write headers:
            output
                .write_all(b"id\tdate\ttag/branch\ttop1\ttop5\tworse\tno suggs\twrong suggs\n")?;
        }
        let row = [
            git_output(&["rev-parse", "--short", "HEAD"])?,
            Local::now().to_rfc3339(),
            git_output(&["describe"])?,
            summary.first_position.to_string(),
            summary.top_five.to_string(),
            summary.any_position.to_string(),
            summary.no_suggestions.to_string(),
            summary.only_wrong.to_string(),
        ];
        output.write_all(row.join("\t").as_bytes())?;
        output.write_all(b"\n")?;
    };

    println!("Done!");
    Ok(())
}
