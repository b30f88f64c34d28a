//! Final score = weighted score discounted by integrity.
//!
//! `final = weighted × (integrity / 100)`. A strong assessment cannot buy back
//! inflated claims; a dishonest resume costs proportionally.

use serde::{Deserialize, Serialize};

use crate::model::{CandidateScoringRecord, SkillContribution};

use super::{clamp_score, round_to};

/// Patch produced by the final-score stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalOutcome {
    /// Display value, two decimals.
    pub final_score: f64,
    /// Exact product, used for ordering.
    pub final_score_raw: f64,
}

pub fn combine(weighted_score: f64, integrity_score: f64) -> FinalOutcome {
    let raw = clamp_score(weighted_score) * (clamp_score(integrity_score) / 100.0);
    FinalOutcome {
        final_score: round_to(raw, 2),
        final_score_raw: raw,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub weighted_score: f64,
    pub integrity_score: f64,
    pub final_score: f64,
    /// Points lost to integrity: `weighted − final`.
    pub integrity_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityIssue {
    pub skill: String,
    pub claimed: String,
    pub scored: f64,
    pub gap: f64,
}

/// Explainability view of how a record's final score came about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub candidate_id: String,
    pub candidate_name: String,
    pub job_id: String,
    pub job_title: String,
    pub scores: ScoreSummary,
    pub formula: String,
    pub skill_breakdown: Vec<SkillContribution>,
    pub integrity_issues: Vec<IntegrityIssue>,
    pub summary: String,
}

impl ScoreBreakdown {
    pub fn from_record(r: &CandidateScoringRecord) -> Self {
        Self {
            candidate_id: r.candidate_id.clone(),
            candidate_name: r.candidate_name.clone(),
            job_id: r.job_id.clone(),
            job_title: r.job_title.clone(),
            scores: ScoreSummary {
                weighted_score: r.weighted_score,
                integrity_score: r.integrity_score,
                final_score: r.final_score,
                integrity_impact: round_to(r.weighted_score - r.final_score, 2),
            },
            formula: format!(
                "{} × ({}/100) = {}",
                r.weighted_score, r.integrity_score, r.final_score
            ),
            skill_breakdown: r.skill_contributions.clone(),
            integrity_issues: r
                .consistency_flags
                .iter()
                .map(|f| IntegrityIssue {
                    skill: f.skill.clone(),
                    claimed: f.claimed_level.to_string(),
                    scored: f.actual_score,
                    gap: f.discrepancy,
                })
                .collect(),
            summary: score_summary(r.weighted_score, r.integrity_score, r.final_score),
        }
    }
}

/// One-sentence, deterministic reading of the three scores.
pub fn score_summary(weighted: f64, integrity: f64, final_score: f64) -> String {
    let performance = if weighted >= 80.0 {
        "excellent technical performance"
    } else if weighted >= 65.0 {
        "strong technical performance"
    } else if weighted >= 50.0 {
        "moderate technical performance"
    } else {
        "below average technical performance"
    };

    let consistency = if integrity >= 95.0 {
        "Outstanding consistency between claims and performance."
    } else if integrity >= 80.0 {
        "Good consistency with minor discrepancies."
    } else if integrity >= 60.0 {
        "Some concerns about resume accuracy."
    } else {
        "Significant discrepancies require verification."
    };

    let recommendation = if final_score >= 75.0 {
        "Strong candidate for advancement."
    } else if final_score >= 55.0 {
        "Consider for next round with focus areas."
    } else {
        "May not meet requirements for this role."
    };

    format!("Candidate shows {performance}. {consistency} {recommendation}")
}
