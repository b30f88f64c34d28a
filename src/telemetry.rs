// src/telemetry.rs
//! Logging and metrics plumbing.
//!
//! The library only emits `tracing` events and `metrics` facade calls; nothing is
//! recorded until the binary installs a subscriber / recorder.

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::model::{CandidateScoringRecord, ShortlistStatus};

pub const ENV_LOG_FORMAT: &str = "SCORING_LOG_FORMAT";
const DEFAULT_FILTER: &str = "candidate_scoring=info,warn";

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the default
/// filter; `SCORING_LOG_FORMAT=json` switches to JSON lines. Logs go to stderr so
/// stdout stays clean for the JSON result.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json = std::env::var(ENV_LOG_FORMAT)
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: a second call (tests, embedding) is a no-op
    let _ = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()
    };
}

/// Short stable pseudonym for log fields. Never log a raw candidate id.
pub fn anon_id(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// One-time metrics registration (so series carry help text in the exposition).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scoring_candidates_total", "Candidates scored successfully.");
        describe_counter!(
            "scoring_candidate_failures_total",
            "Candidates rejected with a structural error."
        );
        describe_counter!(
            "scoring_consistency_flags_total",
            "Resume/assessment consistency flags raised, by severity."
        );
        describe_counter!(
            "shortlist_assignments_total",
            "Shortlist placements, by status."
        );
        describe_histogram!("scoring_final_score", "Final score distribution.");
        describe_histogram!("leaderboard_batch_size", "Candidates per leaderboard run.");
    });
}

pub(crate) fn record_scored(record: &CandidateScoringRecord) {
    ensure_metrics_described();
    counter!("scoring_candidates_total").increment(1);
    histogram!("scoring_final_score").record(record.final_score);
    for flag in &record.consistency_flags {
        counter!("scoring_consistency_flags_total", "severity" => flag.severity.as_str())
            .increment(1);
    }
}

pub(crate) fn record_failure() {
    ensure_metrics_described();
    counter!("scoring_candidate_failures_total").increment(1);
}

pub(crate) fn record_assignment(status: ShortlistStatus) {
    ensure_metrics_described();
    counter!("shortlist_assignments_total", "status" => status.as_str()).increment(1);
}

pub(crate) fn record_batch(size: usize) {
    ensure_metrics_described();
    histogram!("leaderboard_batch_size").record(size as f64);
}

/// Install the Prometheus recorder. Call once, before any scoring.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("prometheus: install recorder")?;
    ensure_metrics_described();
    Ok(handle)
}
