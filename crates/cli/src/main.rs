use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use iqra_core::corpus::domain::verse_index::VerseIndex;
use iqra_core::corpus::infrastructure::corpus_reader_factory::create_reader;
use iqra_core::corpus::infrastructure::{corpus_resolver, shared_index};
use iqra_core::matching::domain::match_report::{MatchReport, ReportSummary, WordRecord};
use iqra_core::matching::domain::mistake_classifier::WordStatus;
use iqra_core::matching::domain::verse_locator::{LocatorConfig, VerseLocator};
use iqra_core::pipeline::batch_executor::{BatchExecutor, BatchJob, BatchOutcome};
use iqra_core::pipeline::infrastructure::threaded_batch_executor::ThreadedBatchExecutor;
use iqra_core::pipeline::locate_and_align_use_case::{LocateAndAlignUseCase, VerseTarget};
use iqra_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use iqra_core::shared::constants::{
    BATCH_RESULTS_FILE_NAME, CORPUS_DIR_NAME, TRANSCRIPT_EXTENSIONS,
};
use iqra_core::shared::settings::Settings;
use iqra_core::text::domain::transcript::Transcript;

/// Locate recited text in the Quran and report word-level mistakes.
#[derive(Parser)]
#[command(name = "iqra", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Reference text file (Tanzil `chapter|verse|text`, Tanzil XML or JSON).
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Settings file (defaults to the per-user settings.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimum overlap ratio for open search to name a verse (0.0-1.0).
    #[arg(long, global = true)]
    min_overlap: Option<f64>,

    /// Search window lengths are transcript length ± this many words.
    #[arg(long, global = true)]
    window_tolerance: Option<usize>,

    /// Overlap candidates re-ranked by edit distance.
    #[arg(long, global = true)]
    top_k: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Match one transcript (argument, --file, or stdin).
    Match {
        /// Recognized text.
        text: Option<String>,

        /// Read the transcript from a file.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Skip search and check against this chapter (requires --verse).
        #[arg(long)]
        chapter: Option<u16>,

        /// Verse within --chapter.
        #[arg(long)]
        verse: Option<u16>,

        /// Last verse of a targeted range.
        #[arg(long)]
        to_verse: Option<u16>,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Match every transcript file in a directory.
    Batch {
        /// Directory of `.txt` transcripts.
        dir: PathBuf,

        /// Where batch_results.json is written (defaults to DIR).
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Worker threads (defaults to available parallelism).
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Print one verse of the reference text.
    Show { chapter: u16, verse: u16 },
    /// Find verses containing a phrase.
    Search { query: String },
    /// List chapters with their verse counts.
    Chapters,
    /// Print the effective settings, optionally saving them.
    Config {
        /// Write the settings to --output, --config or the per-user settings.json.
        #[arg(long)]
        save: bool,

        /// Destination for --save.
        #[arg(long, requires = "save")]
        output: Option<PathBuf>,
    },
}

/// `match --json` output: the export rows plus the full report.
#[derive(Serialize)]
struct MatchJson<'a> {
    summary: ReportSummary,
    words: Vec<WordRecord>,
    report: &'a MatchReport,
}

/// One row of batch_results.json.
#[derive(Serialize)]
struct ReportExport {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ReportSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    words: Vec<WordRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ReportExport {
    fn from_report(file: String, report: &MatchReport) -> Self {
        Self {
            file,
            summary: Some(report.summary()),
            words: report.records(),
            score: Some(report.score()),
            error: None,
        }
    }

    fn from_outcome(outcome: &BatchOutcome) -> Self {
        match &outcome.result {
            Ok(report) => Self::from_report(outcome.name.clone(), report),
            Err(e) => Self {
                file: outcome.name.clone(),
                summary: None,
                words: Vec::new(),
                score: None,
                error: Some(e.to_string()),
            },
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    let settings = effective_settings(&cli, &settings);

    if let Command::Config { save, output } = &cli.command {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        if *save {
            let path = output
                .clone()
                .or_else(|| cli.config.clone())
                .or_else(Settings::config_path)
                .ok_or("No settings location available; pass --output")?;
            settings.save_to(&path)?;
            log::info!("Settings written to {}", path.display());
        }
        return Ok(());
    }

    let locator = VerseLocator::new(settings.locator.clone())?;
    let index = load_index(settings.corpus_path.as_deref())?;

    match cli.command {
        Command::Match {
            text,
            file,
            chapter,
            verse,
            to_verse,
            json,
        } => {
            let transcript = read_transcript(text, file.as_deref())?;
            let target = match (chapter, verse) {
                (Some(chapter), Some(verse)) => Some(VerseTarget {
                    chapter,
                    verse,
                    to_verse,
                }),
                _ => None,
            };
            run_match(index, locator, &transcript, target, json)
        }
        Command::Batch {
            dir,
            export_dir,
            workers,
        } => {
            let export_dir = export_dir.unwrap_or_else(|| dir.clone());
            run_batch(index, locator, &dir, &export_dir, workers)
        }
        Command::Show { chapter, verse } => {
            let record = index.lookup(chapter, verse)?;
            match index.chapter_name(chapter) {
                Some(name) => println!("{name} {}", record.reference()),
                None => println!("{}", record.reference()),
            }
            println!("{}", record.text());
            Ok(())
        }
        Command::Search { query } => {
            let hits = index.search_text(&query);
            for reference in &hits {
                let record = index.lookup(reference.chapter, reference.verse)?;
                println!("{:>7}  {}", reference.to_string(), record.text());
            }
            log::info!("{} verses match '{query}'", hits.len());
            Ok(())
        }
        Command::Chapters => {
            for chapter in index.chapters() {
                println!(
                    "{:>3}  {:<24} {} verses",
                    chapter.number,
                    chapter.name.as_deref().unwrap_or("-"),
                    chapter.verse_count
                );
            }
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}

fn run_match(
    index: Arc<VerseIndex>,
    locator: VerseLocator,
    transcript: &Transcript,
    target: Option<VerseTarget>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let use_case = LocateAndAlignUseCase::new(index, locator);
    let report = use_case.execute(transcript, target)?;

    if json {
        let export = MatchJson {
            summary: report.summary(),
            words: report.records(),
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    println!("{}", report.summary());
    for (record, word) in report.records().iter().zip(report.word_statuses()) {
        match (&word.status, &word.recited) {
            (WordStatus::Incorrect, Some(recited)) => println!(
                "{:>4}  {:<9} {} -> {}",
                record.position,
                record.status.as_str(),
                record.word,
                recited.raw
            ),
            _ => println!(
                "{:>4}  {:<9} {}",
                record.position,
                record.status.as_str(),
                record.word
            ),
        }
    }
    Ok(())
}

fn run_batch(
    index: Arc<VerseIndex>,
    locator: VerseLocator,
    dir: &Path,
    export_dir: &Path,
    workers: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let jobs = collect_jobs(dir)?;
    if jobs.is_empty() {
        return Err(format!("No transcript files found in {}", dir.display()).into());
    }

    let executor = match workers {
        Some(n) => ThreadedBatchExecutor::new(n),
        None => ThreadedBatchExecutor::default(),
    };
    let mut logger = StdoutPipelineLogger::default();
    logger.info(&format!(
        "Matching {} transcripts on {} workers",
        jobs.len(),
        executor.workers()
    ));

    let use_case = Arc::new(LocateAndAlignUseCase::new(index, locator));
    let outcomes = executor.execute(use_case, jobs, &mut logger);
    logger.summary();

    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => println!("{}: {}", outcome.name, report.summary()),
            Err(e) => println!("{}: Error: {e}", outcome.name),
        }
    }

    let rows: Vec<ReportExport> = outcomes.iter().map(ReportExport::from_outcome).collect();
    fs::create_dir_all(export_dir)?;
    let out_path = export_dir.join(BATCH_RESULTS_FILE_NAME);
    fs::write(&out_path, serde_json::to_string_pretty(&rows)?)?;
    log::info!("Results written to {}", out_path.display());
    Ok(())
}

fn load_index(explicit: Option<&Path>) -> Result<Arc<VerseIndex>, Box<dyn std::error::Error>> {
    let bundled = bundled_corpus_dir();
    let path = corpus_resolver::resolve(explicit, bundled.as_deref())?;
    log::info!("Loading corpus: {}", path.display());
    let source = create_reader(&path);
    Ok(shared_index::get_or_init(source.as_ref())?)
}

/// `corpus/` next to the executable, for packaged installs.
fn bundled_corpus_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CORPUS_DIR_NAME)))
}

/// Settings with command-line flags applied on top.
fn effective_settings(cli: &Cli, settings: &Settings) -> Settings {
    let base = &settings.locator;
    Settings {
        locator: LocatorConfig {
            min_overlap: cli.min_overlap.unwrap_or(base.min_overlap),
            window_tolerance: cli.window_tolerance.unwrap_or(base.window_tolerance),
            top_k: cli.top_k.unwrap_or(base.top_k),
        },
        corpus_path: cli.corpus.clone().or_else(|| settings.corpus_path.clone()),
    }
}

fn read_transcript(
    text: Option<String>,
    file: Option<&Path>,
) -> Result<Transcript, Box<dyn std::error::Error>> {
    let raw = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read transcript {}: {e}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(Transcript::from_text(&raw))
}

fn collect_jobs(dir: &Path) -> Result<Vec<BatchJob>, Box<dyn std::error::Error>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| format!("Failed to read directory {}: {e}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_transcript(path))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read transcript {}: {e}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(BatchJob::new(name, Transcript::from_text(&text)))
        })
        .collect()
}

fn is_transcript(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TRANSCRIPT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(min_overlap) = cli.min_overlap {
        if !(0.0..=1.0).contains(&min_overlap) {
            return Err(format!(
                "Min overlap must be between 0.0 and 1.0, got {min_overlap}"
            )
            .into());
        }
    }
    if cli.top_k == Some(0) {
        return Err("Top-k must be at least 1".into());
    }
    if let Some(path) = &cli.corpus {
        if !path.is_file() {
            return Err(format!("Corpus file not found: {}", path.display()).into());
        }
    }
    if let Some(path) = &cli.config {
        if !path.is_file() {
            return Err(format!("Settings file not found: {}", path.display()).into());
        }
    }

    match &cli.command {
        Command::Match {
            text,
            file,
            chapter,
            verse,
            to_verse,
            ..
        } => {
            if text.is_some() && file.is_some() {
                return Err("Transcript text and --file are mutually exclusive".into());
            }
            if chapter.is_some() != verse.is_some() {
                return Err("--chapter and --verse must be given together".into());
            }
            if let (Some(to), Some(from)) = (to_verse, verse) {
                if to < from {
                    return Err(format!("--to-verse {to} is before --verse {from}").into());
                }
            } else if to_verse.is_some() {
                return Err("--to-verse requires --chapter and --verse".into());
            }
        }
        Command::Batch { dir, workers, .. } => {
            if !dir.is_dir() {
                return Err(format!("Transcript directory not found: {}", dir.display()).into());
            }
            if *workers == Some(0) {
                return Err("Workers must be at least 1".into());
            }
        }
        Command::Show { .. }
        | Command::Search { .. }
        | Command::Chapters
        | Command::Config { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clap::CommandFactory;
    use rstest::rstest;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("iqra").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case::text_and_file(&["match", "الم", "--file", "t.txt"])]
    #[case::chapter_without_verse(&["match", "الم", "--chapter", "2"])]
    #[case::to_verse_alone(&["match", "الم", "--to-verse", "3"])]
    #[case::to_verse_before_verse(&["match", "الم", "--chapter", "1", "--verse", "4", "--to-verse", "2"])]
    #[case::min_overlap_out_of_range(&["--min-overlap", "1.5", "chapters"])]
    #[case::zero_top_k(&["--top-k", "0", "chapters"])]
    #[case::zero_workers(&["batch", ".", "--workers", "0"])]
    fn test_validate_rejects(#[case] args: &[&str]) {
        assert!(validate(&parse(args)).is_err());
    }

    #[test]
    fn test_validate_accepts_targeted_range() {
        let cli = parse(&["match", "الرحمن الرحيم", "--chapter", "1", "--verse", "3", "--to-verse", "4"]);
        assert!(validate(&cli).is_ok());
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = parse(&["--top-k", "9", "chapters"]);
        let settings = Settings {
            locator: LocatorConfig {
                min_overlap: 0.8,
                window_tolerance: 2,
                top_k: 3,
            },
            corpus_path: None,
        };
        let effective = effective_settings(&cli, &settings);
        assert_eq!(effective.locator.top_k, 9);
        assert_eq!(effective.locator.window_tolerance, 2);
        assert_relative_eq!(effective.locator.min_overlap, 0.8);
    }

    #[test]
    fn test_corpus_flag_replaces_saved_path() {
        let cli = parse(&["--corpus", "quran-uthmani.xml", "chapters"]);
        let settings = Settings {
            corpus_path: Some(PathBuf::from("quran-simple.txt")),
            ..Settings::default()
        };
        assert_eq!(
            effective_settings(&cli, &settings).corpus_path,
            Some(PathBuf::from("quran-uthmani.xml"))
        );
    }

    #[test]
    fn test_config_output_requires_save() {
        let parsed = Cli::try_parse_from(["iqra", "config", "--output", "s.json"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_saved_effective_settings_load_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        let cli = parse(&["--min-overlap", "0.7", "--top-k", "4", "config", "--save"]);
        let effective = effective_settings(&cli, &Settings::default());
        effective.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_relative_eq!(loaded.locator.min_overlap, 0.7);
        assert_eq!(loaded.locator.top_k, 4);
        assert_eq!(loaded, effective);
    }

    #[rstest]
    #[case::txt("recitation.txt", true)]
    #[case::upper("RECITATION.TXT", true)]
    #[case::json("results.json", false)]
    #[case::no_extension("README", false)]
    fn test_is_transcript(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_transcript(Path::new(name)), expected);
    }
}
