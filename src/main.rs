//! candidate-scoring — command-line entrypoint.
//!
//! Reads job/candidate JSON, runs the scoring pipeline, writes JSON to stdout or a
//! file. Logs go to stderr.

mod cli;

use std::fs;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use candidate_scoring::{
    telemetry, CandidateInput, ClaimAnalysis, JobInput, Leaderboard, LeaderboardAggregator,
    ScoreBreakdown, ScoringConfig, ScoringPipeline,
};

use crate::cli::{Cli, Commands, QueryArgs, QueryView, RankArgs, ScoreArgs};

fn main() {
    // Load .env in local/dev; harmless when absent.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank(args) => rank(args),
        Commands::Score(args) => score(args),
        Commands::Query(args) => query(args),
    }
}

fn rank(args: RankArgs) -> Result<()> {
    let prometheus = if args.metrics {
        Some(telemetry::install_prometheus()?)
    } else {
        None
    };

    let config = load_config(args.config.as_deref())?;
    let job: JobInput = read_json(&args.job).context("loading job")?;
    // parsed per element so one malformed candidate is a failure, not a fatal error
    let candidates: Vec<serde_json::Value> =
        read_json(&args.candidates).context("loading candidates")?;

    let mode = args.mode.unwrap_or(config.shortlist.mode);
    let aggregator = LeaderboardAggregator::new(ScoringPipeline::new(config), mode);
    let leaderboard = aggregator
        .build_from_json(&job, &candidates)
        .stamped(Utc::now());

    write_json(&leaderboard, args.output.as_deref(), args.pretty)?;
    info!(
        entries = leaderboard.entries.len(),
        failures = leaderboard.failures.len(),
        "rank finished"
    );

    if let Some(handle) = prometheus {
        eprintln!("{}", handle.render());
    }
    Ok(())
}

fn score(args: ScoreArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let job: JobInput = read_json(&args.job).context("loading job")?;
    let candidate: CandidateInput = read_json(&args.candidate).context("loading candidate")?;

    let record = ScoringPipeline::new(config)
        .evaluate(&job, &candidate)
        .context("scoring candidate")?;

    let report = json!({
        "breakdown": ScoreBreakdown::from_record(&record),
        "claim_analysis": ClaimAnalysis::from_record(&record),
        "record": record,
    });
    write_json(&report, args.output.as_deref(), args.pretty)
}

fn query(args: QueryArgs) -> Result<()> {
    let board: Leaderboard = read_json(&args.leaderboard).context("loading leaderboard")?;
    let out = args.output.as_deref();

    match args.view {
        QueryView::Page {
            status,
            offset,
            limit,
        } => write_json(&board.page(status, offset, limit), out, args.pretty),
        QueryView::Shortlist { status } => write_json(&board.shortlist(status), out, args.pretty),
        QueryView::Candidate { id } => {
            let entry = board
                .candidate(&id)
                .with_context(|| format!("candidate {id} not on leaderboard {}", board.job_id))?;
            write_json(entry, out, args.pretty)
        }
        QueryView::Stats => match board.report() {
            Some(report) => write_json(&report, out, args.pretty),
            None => write_json(
                &json!({ "job_id": board.job_id, "message": "No candidates to analyze" }),
                out,
                args.pretty,
            ),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<ScoringConfig> {
    match path {
        Some(p) => ScoringConfig::load_from_file(p),
        None => ScoringConfig::load_default(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>, pretty: bool) -> Result<()> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');

    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(text.as_bytes())
                .context("writing stdout")?;
        }
    }
    Ok(())
}
