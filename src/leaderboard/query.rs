// src/leaderboard/query.rs
//! Read-side views over a built [`Leaderboard`]: filtered pages, per-round
//! shortlists, single-candidate lookup and a cohort score report.
//!
//! Everything here borrows the leaderboard and never re-scores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Leaderboard, LeaderboardEntry, ScoreRange};
use crate::model::ShortlistStatus;
use crate::scoring::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: usize,
    pub limit: Option<usize>,
    pub has_more: bool,
}

/// One page of the leaderboard, optionally restricted to a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardPage {
    pub job_id: String,
    pub job_title: String,
    pub total_applicants: usize,
    /// Entries matching the filter, before paging.
    pub total_filtered: usize,
    pub entries: Vec<LeaderboardEntry>,
    pub round_1_count: usize,
    pub round_2_count: usize,
    pub rejected_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortlist {
    pub job_id: String,
    pub status: ShortlistStatus,
    pub shortlisted_count: usize,
    pub total_applicants: usize,
    /// `shortlisted_count / total_applicants` in percent, one decimal.
    pub shortlist_rate: f64,
    pub candidates: Vec<LeaderboardEntry>,
}

/// Min/max/avg plus the upper median (`sorted[n / 2]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSpread {
    #[serde(flatten)]
    pub range: ScoreRange,
    pub median: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub final_score: ScoreSpread,
    pub weighted_score: ScoreRange,
    pub integrity_score: ScoreRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortlistSummary {
    pub round_2: usize,
    pub round_1: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencySummary {
    pub candidates_with_issues: usize,
    pub percentage: f64,
}

/// Score report over the ranked entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortReport {
    pub job_id: String,
    pub job_title: String,
    /// Ranked candidates only.
    pub total_applicants: usize,
    pub shortlist_summary: ShortlistSummary,
    pub score_distribution: ScoreDistribution,
    pub consistency_issues: ConsistencySummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 1)
}

impl Leaderboard {
    /// Entries in rank order, filtered by tier, then `offset`/`limit` applied.
    /// An offset past the end yields an empty page.
    pub fn page(
        &self,
        status: Option<ShortlistStatus>,
        offset: usize,
        limit: Option<usize>,
    ) -> LeaderboardPage {
        let filtered: Vec<&LeaderboardEntry> = self
            .entries
            .iter()
            .filter(|e| status.map_or(true, |s| e.shortlist_status == s))
            .collect();
        let total_filtered = filtered.len();
        let entries: Vec<LeaderboardEntry> = filtered
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        let has_more = offset.saturating_add(entries.len()) < total_filtered;

        LeaderboardPage {
            job_id: self.job_id.clone(),
            job_title: self.job_title.clone(),
            total_applicants: self.total_applicants,
            total_filtered,
            entries,
            round_1_count: self.round_1_count,
            round_2_count: self.round_2_count,
            rejected_count: self.rejected_count,
            generated_at: self.generated_at,
            pagination: Pagination {
                offset,
                limit,
                has_more,
            },
        }
    }

    /// Everyone placed in `status`, with the share of all submitted candidates.
    pub fn shortlist(&self, status: ShortlistStatus) -> Shortlist {
        let candidates = self.page(Some(status), 0, None).entries;
        Shortlist {
            job_id: self.job_id.clone(),
            status,
            shortlisted_count: candidates.len(),
            total_applicants: self.total_applicants,
            shortlist_rate: percent_of(candidates.len(), self.total_applicants),
            candidates,
        }
    }

    /// First entry with this id. Duplicate ids resolve to the better-ranked one.
    pub fn candidate(&self, candidate_id: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.candidate_id == candidate_id)
    }

    /// `None` when nothing was ranked.
    pub fn report(&self) -> Option<CohortReport> {
        if self.entries.is_empty() {
            return None;
        }
        let finals: Vec<f64> = self.entries.iter().map(|e| e.final_score).collect();
        let weighted: Vec<f64> = self.entries.iter().map(|e| e.weighted_score).collect();
        let integrity: Vec<f64> = self.entries.iter().map(|e| e.integrity_score).collect();

        let mut sorted = finals.clone();
        sorted.sort_by(f64::total_cmp);
        let median = round_to(sorted[sorted.len() / 2], 2);

        let with_issues = self
            .entries
            .iter()
            .filter(|e| e.has_consistency_issues)
            .count();

        Some(CohortReport {
            job_id: self.job_id.clone(),
            job_title: self.job_title.clone(),
            total_applicants: self.entries.len(),
            shortlist_summary: ShortlistSummary {
                round_2: self.round_2_count,
                round_1: self.round_1_count,
                rejected: self.rejected_count,
            },
            score_distribution: ScoreDistribution {
                final_score: ScoreSpread {
                    range: ScoreRange::of(&finals),
                    median,
                },
                weighted_score: ScoreRange::of(&weighted),
                integrity_score: ScoreRange::of(&integrity),
            },
            consistency_issues: ConsistencySummary {
                candidates_with_issues: with_issues,
                percentage: percent_of(with_issues, self.entries.len()),
            },
            generated_at: self.generated_at,
        })
    }
}
