use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use readalong_rs::{
    aggregate_reports, compute_case_report, CaseReport, FrameReport, HighlightConfig,
    HighlighterBuilder, Meta, ReferenceText, Report, StateCounts, TranscriptUpdate,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[path = "highlight_replay/json_report_formatter.rs"]
mod json_report_formatter;
#[path = "highlight_replay/text_report_formatter.rs"]
mod text_report_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "highlight_replay")]
#[command(about = "Replay recorded transcript updates through the karaoke highlighter")]
struct Args {
    /// Case files: one case object or an array of cases per file.
    #[arg(required = true)]
    cases: Vec<PathBuf>,
    #[arg(long, env = "READALONG_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "READALONG_REPORT_OUT")]
    out: Option<PathBuf>,
    #[arg(
        long,
        env = "READALONG_REPORT_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json
    )]
    output_format: OutputFormat,
    /// Keep the rendered markup of every update in the report.
    #[arg(long, default_value_t = false)]
    include_markup: bool,
    #[arg(long, default_value_t = false)]
    no_progress: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ReplayCase {
    id: String,
    /// Falls back to the markup's visible text when absent.
    #[serde(default)]
    plain: Option<String>,
    markup: String,
    updates: Vec<TranscriptUpdate>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaseFile {
    Many(Vec<ReplayCase>),
    One(ReplayCase),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let config = match args.config.as_ref() {
        Some(path) => HighlightConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => HighlightConfig::default(),
    };

    let mut cases = Vec::new();
    for path in &args.cases {
        cases.extend(load_case_file(path)?);
    }
    if cases.is_empty() {
        return Err("No cases found in the given files.".to_string());
    }

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(cases.len() as u64)
    };
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut case_reports = Vec::with_capacity(cases.len());
    for case in &cases {
        progress.set_message(case.id.clone());
        case_reports.push(replay_case(case, &config, args.include_markup)?);
        progress.inc(1);
    }
    progress.finish_with_message("replay complete");

    let aggregates = aggregate_reports(&case_reports);
    let report = Report {
        schema_version: 1,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            language: config.language.clone(),
            lookahead_window: u32::try_from(config.lookahead_window).unwrap_or(u32::MAX),
            similarity_threshold: config.similarity_threshold,
            case_count: case_reports.len(),
        },
        cases: case_reports,
        aggregates,
    };

    let rendered = match args.output_format {
        OutputFormat::Json => json_report_formatter::render_report(&report)?,
        OutputFormat::Text => text_report_formatter::render_report(&report),
    };
    match args.out.as_ref() {
        Some(path) => {
            json_report_formatter::write_output(path, &rendered)?;
            println!("{}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn replay_case(
    case: &ReplayCase,
    config: &HighlightConfig,
    include_markup: bool,
) -> Result<CaseReport, String> {
    let mut session = HighlighterBuilder::new(config.clone())
        .build_session()
        .map_err(|err| format!("{}: failed to build session: {err}", case.id))?;
    let reference = match case.plain.as_deref() {
        Some(plain) => ReferenceText::new(plain, case.markup.as_str()),
        None => ReferenceText::from_markup(case.markup.as_str()),
    };
    let token_count = reference.tokens().len();
    session.replace_reference(reference);

    let untagged = session
        .start()
        .map_err(|err| format!("{}: failed to start: {err}", case.id))?;

    let mut frames = Vec::with_capacity(case.updates.len());
    for (idx, update) in case.updates.iter().enumerate() {
        let markup = session.on_update(update).unwrap_or_else(|| untagged.clone());
        let states = session.highlighter().states();
        frames.push(FrameReport {
            update_index: u32::try_from(idx).unwrap_or(u32::MAX),
            final_transcript: session.final_transcript().to_string(),
            interim_transcript: session.interim_transcript().to_string(),
            counts: StateCounts::tally(&states),
            states,
            markup: include_markup.then_some(markup),
        });
    }

    session
        .stop()
        .map_err(|err| format!("{}: failed to stop: {err}", case.id))?;
    let evaluation = session
        .on_end()
        .map_err(|err| format!("{}: scoring failed: {err}", case.id))?;

    compute_case_report(
        &case.id,
        token_count,
        frames,
        evaluation.map(|evaluation| evaluation.score),
    )
    .map_err(|err| format!("{}: {err}", case.id))
}

fn load_case_file(path: &Path) -> Result<Vec<ReplayCase>, String> {
    let file = File::open(path)
        .map_err(|err| format!("Failed to open case file '{}': {err}", path.display()))?;
    let parsed: CaseFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("Failed to parse case file '{}': {err}", path.display()))?;
    Ok(match parsed {
        CaseFile::Many(cases) => cases,
        CaseFile::One(case) => vec![case],
    })
}
