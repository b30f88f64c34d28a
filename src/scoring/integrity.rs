//! Integrity check: do the resume claims hold up against the assessment?
//!
//! Starts at 100 and subtracts a capped penalty per flagged skill. Only
//! under-performance counts; scoring above a claim is never penalized. Claims for
//! skills that were not assessed cannot be verified and are skipped.

use serde::{Deserialize, Serialize};

use crate::config::IntegrityConfig;
use crate::model::{CandidateScoringRecord, ConsistencyFlag, ResumeClaim, Severity};
use crate::skill_key::SkillIndex;

use super::{clamp_score, round_to};

/// Patch produced by the integrity stage.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityOutcome {
    /// `[0, 100]`, two decimals.
    pub integrity_score: f64,
    /// In claim order.
    pub consistency_flags: Vec<ConsistencyFlag>,
    /// Claims that had a matching assessed skill.
    pub skills_checked: usize,
}

/// Compare every verifiable claim with the assessed score.
pub fn check(
    claims: &[ResumeClaim],
    index: &SkillIndex<'_>,
    cfg: &IntegrityConfig,
) -> IntegrityOutcome {
    let mut flags = Vec::new();
    let mut total_penalty = 0.0f64;
    let mut skills_checked = 0usize;

    for claim in claims {
        let Some(raw) = index.score_of(&claim.skill) else {
            continue;
        };
        skills_checked += 1;

        let actual = clamp_score(raw);
        let expected = cfg.expected_for(claim.claimed_level);
        let discrepancy = expected - actual;

        let Some(severity) = classify(discrepancy, cfg) else {
            continue;
        };
        total_penalty += penalty(discrepancy, severity, cfg);
        flags.push(ConsistencyFlag {
            skill: claim.skill.clone(),
            claimed_level: claim.claimed_level,
            actual_score: round_to(actual, 1),
            expected_score: expected,
            discrepancy: round_to(discrepancy, 1),
            severity,
        });
    }

    let mut score = (100.0 - total_penalty).max(0.0);
    if flags.is_empty() && skills_checked > 0 {
        score = (score + cfg.consistency_bonus).min(100.0);
    }

    IntegrityOutcome {
        integrity_score: round_to(score, 2),
        consistency_flags: flags,
        skills_checked,
    }
}

/// Severity of an under-performance gap; `None` below the low threshold.
pub fn classify(discrepancy: f64, cfg: &IntegrityConfig) -> Option<Severity> {
    let t = &cfg.severity;
    if discrepancy <= 0.0 {
        None
    } else if discrepancy >= t.high {
        Some(Severity::High)
    } else if discrepancy >= t.medium {
        Some(Severity::Medium)
    } else if discrepancy >= t.low {
        Some(Severity::Low)
    } else {
        None
    }
}

/// `discrepancy × multiplier`, capped per skill.
pub fn penalty(discrepancy: f64, severity: Severity, cfg: &IntegrityConfig) -> f64 {
    (discrepancy.max(0.0) * cfg.multiplier_for(severity)).min(cfg.penalty_cap)
}

/// Reviewer-facing summary of a scored record's integrity findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAnalysis {
    pub integrity_score: f64,
    pub total_issues: usize,
    pub high_severity_count: usize,
    pub medium_severity_count: usize,
    pub low_severity_count: usize,
    pub recommendation: String,
    pub details: Vec<ConsistencyFlag>,
}

impl ClaimAnalysis {
    pub fn from_record(record: &CandidateScoringRecord) -> Self {
        let count = |sev: Severity| {
            record
                .consistency_flags
                .iter()
                .filter(|f| f.severity == sev)
                .count()
        };
        Self {
            integrity_score: record.integrity_score,
            total_issues: record.consistency_flags.len(),
            high_severity_count: count(Severity::High),
            medium_severity_count: count(Severity::Medium),
            low_severity_count: count(Severity::Low),
            recommendation: recommendation(record.integrity_score).to_string(),
            details: record.consistency_flags.clone(),
        }
    }
}

pub fn recommendation(integrity_score: f64) -> &'static str {
    if integrity_score >= 90.0 {
        "Excellent consistency - resume claims align with performance"
    } else if integrity_score >= 70.0 {
        "Good consistency - minor discrepancies noted"
    } else if integrity_score >= 50.0 {
        "Moderate concerns - verify claims in interview"
    } else {
        "Significant discrepancies - requires careful review"
    }
}
