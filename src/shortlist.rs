//! shortlist.rs — Tier assignment for one candidate or a whole cohort.
//!
//! Absolute mode looks at the final score alone. Percentile mode ranks the cohort
//! and lets the top slice advance even when the job was hard enough to depress
//! every absolute score; a high score still advances no matter the rank.
//!
//! Both modes compare the displayed (two-decimal) score against the thresholds, so a
//! cohort of one always lands where the single-candidate path would put it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ShortlistConfig;
use crate::model::{CandidateScoringRecord, ShortlistStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortlistMode {
    /// Threshold OR top-percentile rank.
    #[default]
    Percentile,
    /// Thresholds only; the cohort is still ranked.
    Absolute,
}

impl ShortlistMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShortlistMode::Percentile => "percentile",
            ShortlistMode::Absolute => "absolute",
        }
    }
}

impl fmt::Display for ShortlistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShortlistMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentile" => Ok(ShortlistMode::Percentile),
            "absolute" => Ok(ShortlistMode::Absolute),
            other => Err(format!("unknown shortlist mode '{other}'")),
        }
    }
}

/// Single-candidate placement by thresholds.
pub fn assign_absolute(final_score: f64, cfg: &ShortlistConfig) -> ShortlistStatus {
    if final_score >= cfg.round_2_threshold {
        ShortlistStatus::Round2
    } else if final_score >= cfg.round_1_threshold {
        ShortlistStatus::Round1
    } else {
        ShortlistStatus::Rejected
    }
}

/// Last rank (inclusive) that reaches round 2 / round 1 by position alone.
/// Integer floor of `n × pct / 100`; a cohort below 10 has no round-2 slot.
pub fn cutoff_ranks(n: usize, cfg: &ShortlistConfig) -> (usize, usize) {
    let r2 = n * cfg.round_2_percentile as usize / 100;
    let r1 = n * cfg.round_1_percentile as usize / 100;
    (r2, r1)
}

/// Placement of a ranked candidate (1-based `rank`) in percentile mode.
pub fn assign_ranked(
    final_score: f64,
    rank: usize,
    cutoffs: (usize, usize),
    cfg: &ShortlistConfig,
) -> ShortlistStatus {
    let (r2, r1) = cutoffs;
    if final_score >= cfg.round_2_threshold || rank <= r2 {
        ShortlistStatus::Round2
    } else if final_score >= cfg.round_1_threshold || rank <= r1 {
        ShortlistStatus::Round1
    } else {
        ShortlistStatus::Rejected
    }
}

/// Rank and place a scored cohort.
///
/// Stable sort by unrounded final score, descending; ties keep input order. Ranks
/// are 1..=N. Any prior rank/status on the records is discarded.
pub fn batch_shortlist(
    mut records: Vec<CandidateScoringRecord>,
    cfg: &ShortlistConfig,
    mode: ShortlistMode,
) -> Vec<CandidateScoringRecord> {
    records.sort_by(|a, b| b.final_score_raw().total_cmp(&a.final_score_raw()));

    let cutoffs = cutoff_ranks(records.len(), cfg);
    records
        .into_iter()
        .enumerate()
        .map(|(i, rec)| {
            let rank = i + 1;
            let status = match mode {
                ShortlistMode::Percentile => assign_ranked(rec.final_score, rank, cutoffs, cfg),
                ShortlistMode::Absolute => assign_absolute(rec.final_score, cfg),
            };
            rec.with_placement(Some(rank), status)
        })
        .collect()
}
