// src/leaderboard/mod.rs
//! Cohort runs: score every candidate, rank, place, summarize.
//!
//! Scoring is a parallel map (`rayon`, order-preserving); ranking and statistics
//! are a sequential pass over the finished scores. A candidate that fails
//! structurally is reported in `failures` and the rest of the cohort carries on.
//! Read-side views over a finished leaderboard live in [`query`].

pub mod query;

pub use query::{
    CohortReport, ConsistencySummary, LeaderboardPage, Pagination, ScoreDistribution, ScoreSpread,
    Shortlist, ShortlistSummary,
};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, info_span, warn, Span};

use crate::model::{CandidateInput, CandidateScoringRecord, JobInput, ShortlistStatus, SkillContribution};
use crate::scoring::{round_to, ScoringPipeline};
use crate::shortlist::{batch_shortlist, ShortlistMode};
use crate::telemetry;

/// Display row of the leaderboard; drops the raw input lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub candidate_id: String,
    pub candidate_name: String,
    pub weighted_score: f64,
    pub integrity_score: f64,
    pub final_score: f64,
    pub rank: usize,
    pub shortlist_status: ShortlistStatus,
    pub skill_breakdown: Vec<SkillContribution>,
    pub has_consistency_issues: bool,
}

impl LeaderboardEntry {
    pub fn from_record(r: &CandidateScoringRecord) -> Self {
        Self {
            candidate_id: r.candidate_id.clone(),
            candidate_name: r.candidate_name.clone(),
            weighted_score: r.weighted_score,
            integrity_score: r.integrity_score,
            final_score: r.final_score,
            rank: r.rank.unwrap_or_default(),
            shortlist_status: r.shortlist_status,
            skill_breakdown: r.skill_contributions.clone(),
            has_consistency_issues: r.has_consistency_issues(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl ScoreRange {
    /// Zeroes for an empty tier.
    pub fn of(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        Self {
            min: round_to(min, 2),
            max: round_to(max, 2),
            avg: round_to(avg, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierMember {
    pub candidate_id: String,
    pub candidate_name: String,
    pub final_score: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStatistics {
    pub count: usize,
    /// Share of the scored cohort, one decimal.
    pub percentage: f64,
    pub score_range: ScoreRange,
    /// Listed for advancing tiers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<TierMember>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancementRate {
    /// Round 1 plus round 2, percent.
    pub to_round_1: f64,
    pub to_round_2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardStatistics {
    /// Candidates that were scored and ranked.
    pub total_applicants: usize,
    pub round_2: TierStatistics,
    pub round_1: TierStatistics,
    pub rejected: TierStatistics,
    pub advancement_rate: AdvancementRate,
}

impl LeaderboardStatistics {
    /// Statistics over already-ranked records. An empty cohort is all zeroes.
    pub fn from_ranked(records: &[CandidateScoringRecord]) -> Self {
        let total = records.len();
        let pct = |count: usize| {
            if total == 0 {
                0.0
            } else {
                round_to(count as f64 / total as f64 * 100.0, 1)
            }
        };
        let tier = |status: ShortlistStatus, list_members: bool| {
            let members: Vec<&CandidateScoringRecord> = records
                .iter()
                .filter(|r| r.shortlist_status == status)
                .collect();
            let scores: Vec<f64> = members.iter().map(|r| r.final_score).collect();
            TierStatistics {
                count: members.len(),
                percentage: pct(members.len()),
                score_range: ScoreRange::of(&scores),
                candidates: list_members.then(|| {
                    members
                        .iter()
                        .map(|r| TierMember {
                            candidate_id: r.candidate_id.clone(),
                            candidate_name: r.candidate_name.clone(),
                            final_score: r.final_score,
                            rank: r.rank.unwrap_or_default(),
                        })
                        .collect()
                }),
            }
        };

        let round_2 = tier(ShortlistStatus::Round2, true);
        let round_1 = tier(ShortlistStatus::Round1, true);
        let rejected = tier(ShortlistStatus::Rejected, false);
        let advancement_rate = AdvancementRate {
            to_round_1: pct(round_1.count + round_2.count),
            to_round_2: pct(round_2.count),
        };

        Self {
            total_applicants: total,
            round_2,
            round_1,
            rejected,
            advancement_rate,
        }
    }
}

/// A candidate the batch could not score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFailure {
    /// Position in the submitted candidate list.
    pub index: usize,
    pub candidate_id: String,
    pub error: String,
}

/// Batch output for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub job_id: String,
    pub job_title: String,
    /// Every submitted candidate, failures included.
    pub total_applicants: usize,
    pub entries: Vec<LeaderboardEntry>,
    pub round_1_count: usize,
    pub round_2_count: usize,
    pub rejected_count: usize,
    pub statistics: LeaderboardStatistics,
    pub failures: Vec<CandidateFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl Leaderboard {
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        self.generated_at = Some(now);
        self
    }
}

/// Ranked full records plus the candidates that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortOutcome {
    pub records: Vec<CandidateScoringRecord>,
    pub failures: Vec<CandidateFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardAggregator {
    pipeline: ScoringPipeline,
    mode: ShortlistMode,
}

impl LeaderboardAggregator {
    pub fn new(pipeline: ScoringPipeline, mode: ShortlistMode) -> Self {
        Self { pipeline, mode }
    }

    /// Score, rank and place the cohort. Records come back in rank order.
    pub fn score_cohort(&self, job: &JobInput, candidates: &[CandidateInput]) -> CohortOutcome {
        let indexed: Vec<(usize, &CandidateInput)> = candidates.iter().enumerate().collect();
        self.score_indexed(job, &indexed, Vec::new())
    }

    /// `candidates` carry their position in the submitted list; `failures` are
    /// candidates already rejected upstream and are merged in index order.
    fn score_indexed(
        &self,
        job: &JobInput,
        candidates: &[(usize, &CandidateInput)],
        mut failures: Vec<CandidateFailure>,
    ) -> CohortOutcome {
        let cohort = candidates.len() + failures.len();
        let _span = info_span!("leaderboard", job_id = %job.job_id, cohort).entered();
        telemetry::record_batch(cohort);

        let job = self.pipeline.prepare_job(job);
        // rayon workers do not inherit the caller's span
        let parent = Span::current();
        let results: Vec<_> = candidates
            .par_iter()
            .map(|(_, c)| parent.in_scope(|| self.pipeline.score_prepared(&job, c)))
            .collect();

        let mut scored = Vec::with_capacity(results.len());
        for (result, (index, candidate)) in results.into_iter().zip(candidates) {
            match result {
                Ok(rec) => scored.push(rec),
                Err(e) => failures.push(CandidateFailure {
                    index: *index,
                    candidate_id: candidate.candidate_id.clone(),
                    error: e.to_string(),
                }),
            }
        }
        failures.sort_by_key(|f| f.index);
        if !failures.is_empty() {
            warn!(failed = failures.len(), "some candidates could not be scored");
        }

        let records = batch_shortlist(scored, &self.pipeline.config().shortlist, self.mode);
        for r in &records {
            telemetry::record_assignment(r.shortlist_status);
        }

        CohortOutcome { records, failures }
    }

    /// Full leaderboard for one job. Unstamped; see `Leaderboard::stamped`.
    pub fn build(&self, job: &JobInput, candidates: &[CandidateInput]) -> Leaderboard {
        let outcome = self.score_cohort(job, candidates);
        self.assemble(job, candidates.len(), outcome)
    }

    /// Like [`build`](Self::build), but over raw JSON candidates. An element that
    /// does not parse as a candidate becomes a failure at its index instead of
    /// sinking the whole batch.
    pub fn build_from_json(&self, job: &JobInput, raw: &[Value]) -> Leaderboard {
        let mut parsed = Vec::with_capacity(raw.len());
        let mut failures = Vec::new();
        for (index, value) in raw.iter().enumerate() {
            match CandidateInput::deserialize(value) {
                Ok(c) => parsed.push((index, c)),
                Err(e) => {
                    telemetry::record_failure();
                    let candidate_id = value
                        .get("candidate_id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    warn!(index, error = %e, "candidate rejected while parsing");
                    failures.push(CandidateFailure {
                        index,
                        candidate_id,
                        error: format!("invalid candidate: {e}"),
                    });
                }
            }
        }

        let indexed: Vec<(usize, &CandidateInput)> = parsed.iter().map(|(i, c)| (*i, c)).collect();
        let outcome = self.score_indexed(job, &indexed, failures);
        self.assemble(job, raw.len(), outcome)
    }

    fn assemble(&self, job: &JobInput, submitted: usize, outcome: CohortOutcome) -> Leaderboard {
        let CohortOutcome { records, failures } = outcome;
        let statistics = LeaderboardStatistics::from_ranked(&records);

        info!(
            job_id = %job.job_id,
            mode = %self.mode,
            ranked = records.len(),
            round_2 = statistics.round_2.count,
            round_1 = statistics.round_1.count,
            rejected = statistics.rejected.count,
            failed = failures.len(),
            "leaderboard built"
        );

        Leaderboard {
            job_id: job.job_id.trim().to_string(),
            job_title: job.job_title.clone(),
            total_applicants: submitted,
            entries: records.iter().map(LeaderboardEntry::from_record).collect(),
            round_1_count: statistics.round_1.count,
            round_2_count: statistics.round_2.count,
            rejected_count: statistics.rejected.count,
            statistics,
            failures,
            generated_at: None,
        }
    }
}
