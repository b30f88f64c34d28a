//! model.rs — Input contracts and the per-candidate scoring record.
//!
//! Inputs (`SkillWeight`, `SkillScore`, `ResumeClaim`) come from upstream parsers and
//! are never trusted blindly: numeric ranges are enforced where the values are used,
//! not here. Derived shapes (`SkillContribution`, `ConsistencyFlag`) only exist as
//! outputs of the scoring stages.

use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::scoring::final_score::FinalOutcome;
use crate::scoring::integrity::IntegrityOutcome;
use crate::scoring::weighted::WeightedOutcome;

/// Importance of one skill for a job, as extracted from the job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillWeight {
    pub skill: String,
    /// Share of the overall score in `[0.0, 1.0]`; one job's weights should sum to 1.0.
    pub weight: f64,
    /// Employer-facing importance, nominally 1–10. Informational only.
    #[serde(default = "default_importance")]
    pub importance: i64,
}

fn default_importance() -> i64 {
    5
}

impl SkillWeight {
    pub fn new(skill: impl Into<String>, weight: f64) -> Self {
        Self {
            skill: skill.into(),
            weight,
            importance: default_importance(),
        }
    }
}

/// Assessment result for one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub skill: String,
    /// Percentage score in `[0, 100]`.
    pub score: f64,
    /// Informational counters; any integer is accepted.
    #[serde(default)]
    pub questions_attempted: i64,
    #[serde(default)]
    pub correct_answers: i64,
    #[serde(default)]
    pub avg_difficulty: f64,
}

impl SkillScore {
    pub fn new(skill: impl Into<String>, score: f64) -> Self {
        Self {
            skill: skill.into(),
            score,
            questions_attempted: 0,
            correct_answers: 0,
            avg_difficulty: 0.0,
        }
    }
}

/// Proficiency a candidate claims on their resume.
///
/// Parsed case-insensitively with surrounding whitespace ignored; anything else
/// lands in `Unknown` so a single odd claim cannot fail a whole cohort file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProficiencyLevel {
    Expert,
    Advanced,
    Intermediate,
    Beginner,
    Unknown,
}

impl ProficiencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyLevel::Expert => "Expert",
            ProficiencyLevel::Advanced => "Advanced",
            ProficiencyLevel::Intermediate => "Intermediate",
            ProficiencyLevel::Beginner => "Beginner",
            ProficiencyLevel::Unknown => "Unknown",
        }
    }
}

impl FromStr for ProficiencyLevel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "expert" => ProficiencyLevel::Expert,
            "advanced" => ProficiencyLevel::Advanced,
            "intermediate" => ProficiencyLevel::Intermediate,
            "beginner" => ProficiencyLevel::Beginner,
            _ => ProficiencyLevel::Unknown,
        })
    }
}

impl<'de> Deserialize<'de> for ProficiencyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(ProficiencyLevel::Unknown))
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One skill claim from the candidate's resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeClaim {
    pub skill: String,
    pub claimed_level: ProficiencyLevel,
    #[serde(default)]
    pub years_experience: Option<i64>,
}

impl ResumeClaim {
    pub fn new(skill: impl Into<String>, level: ProficiencyLevel) -> Self {
        Self {
            skill: skill.into(),
            claimed_level: level,
            years_experience: None,
        }
    }

    pub fn years(mut self, years: i64) -> Self {
        self.years_experience = Some(years);
        self
    }
}

/// How much one weighted skill added to the weighted score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillContribution {
    pub skill: String,
    pub score: f64,
    pub weight: f64,
    /// `score × weight`, rounded to two decimals.
    pub contribution: f64,
    /// Share of the weighted score in percent, rounded to one decimal.
    pub percentage_of_total: f64,
    /// Set only when the skill was required but never assessed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// A skill where the candidate scored below what their claimed level implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyFlag {
    pub skill: String,
    pub claimed_level: ProficiencyLevel,
    pub actual_score: f64,
    pub expected_score: f64,
    /// `expected_score − actual_score`; always positive on a flag.
    pub discrepancy: f64,
    pub severity: Severity,
}

/// Shortlist tier. `Pending` until a shortlist pass has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShortlistStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "round_1")]
    Round1,
    #[serde(rename = "round_2")]
    Round2,
    #[serde(rename = "rejected")]
    Rejected,
}

impl ShortlistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShortlistStatus::Pending => "pending",
            ShortlistStatus::Round1 => "round_1",
            ShortlistStatus::Round2 => "round_2",
            ShortlistStatus::Rejected => "rejected",
        }
    }

    pub fn is_advancing(&self) -> bool {
        matches!(self, ShortlistStatus::Round1 | ShortlistStatus::Round2)
    }
}

impl fmt::Display for ShortlistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShortlistStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ShortlistStatus::Pending),
            "round_1" => Ok(ShortlistStatus::Round1),
            "round_2" => Ok(ShortlistStatus::Round2),
            "rejected" => Ok(ShortlistStatus::Rejected),
            other => Err(format!("unknown shortlist status '{other}'")),
        }
    }
}

/// Per-job input: identity plus the skill weights from the job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobInput {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub skill_weights: Vec<SkillWeight>,
}

impl JobInput {
    pub fn new(job_id: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            job_title: job_title.into(),
            skill_weights: Vec::new(),
        }
    }

    pub fn with_weight(mut self, w: SkillWeight) -> Self {
        self.skill_weights.push(w);
        self
    }
}

/// Per-candidate input: identity plus assessment scores and resume claims.
///
/// Identity fields default to empty so a malformed entry still deserializes and
/// can be reported as a per-candidate failure instead of rejecting the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateInput {
    #[serde(default)]
    pub candidate_id: String,
    #[serde(default)]
    pub candidate_name: String,
    #[serde(default)]
    pub skill_scores: Vec<SkillScore>,
    #[serde(default)]
    pub resume_claims: Vec<ResumeClaim>,
}

impl CandidateInput {
    pub fn new(candidate_id: impl Into<String>, candidate_name: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            candidate_name: candidate_name.into(),
            skill_scores: Vec::new(),
            resume_claims: Vec::new(),
        }
    }

    pub fn with_score(mut self, s: SkillScore) -> Self {
        self.skill_scores.push(s);
        self
    }

    pub fn with_claim(mut self, c: ResumeClaim) -> Self {
        self.resume_claims.push(c);
        self
    }
}

/// The unit of work and output of the pipeline.
///
/// Each stage hands back a patch (`WeightedOutcome`, `IntegrityOutcome`, …) that is
/// merged by value via the `with_*` methods; nothing edits a finished record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScoringRecord {
    pub candidate_id: String,
    pub candidate_name: String,
    pub job_id: String,
    pub job_title: String,

    pub skill_scores: Vec<SkillScore>,
    pub skill_weights: Vec<SkillWeight>,
    pub resume_claims: Vec<ResumeClaim>,

    pub weighted_score: f64,
    pub skill_contributions: Vec<SkillContribution>,
    pub integrity_score: f64,
    pub consistency_flags: Vec<ConsistencyFlag>,
    pub final_score: f64,
    pub rank: Option<usize>,
    pub shortlist_status: ShortlistStatus,
    pub processing_errors: Vec<String>,

    /// Unrounded final score; ordering uses this so rounding never creates ties.
    #[serde(skip)]
    final_score_raw: f64,
}

impl CandidateScoringRecord {
    /// Fresh record for one (job, candidate) pair, with neutral defaults:
    /// integrity 100, everything else zero/empty, status `pending`.
    pub fn new(job: &JobInput, candidate: &CandidateInput) -> Self {
        Self {
            candidate_id: candidate.candidate_id.trim().to_string(),
            candidate_name: candidate.candidate_name.clone(),
            job_id: job.job_id.trim().to_string(),
            job_title: job.job_title.clone(),
            skill_scores: candidate.skill_scores.clone(),
            skill_weights: job.skill_weights.clone(),
            resume_claims: candidate.resume_claims.clone(),
            weighted_score: 0.0,
            skill_contributions: Vec::new(),
            integrity_score: 100.0,
            consistency_flags: Vec::new(),
            final_score: 0.0,
            rank: None,
            shortlist_status: ShortlistStatus::Pending,
            processing_errors: Vec::new(),
            final_score_raw: 0.0,
        }
    }

    pub fn with_weighted(mut self, patch: WeightedOutcome) -> Self {
        self.weighted_score = patch.weighted_score;
        self.skill_contributions = patch.skill_contributions;
        self.processing_errors.extend(patch.notes);
        self
    }

    pub fn with_integrity(mut self, patch: IntegrityOutcome) -> Self {
        self.integrity_score = patch.integrity_score;
        self.consistency_flags = patch.consistency_flags;
        self
    }

    pub fn with_final(mut self, patch: FinalOutcome) -> Self {
        self.final_score = patch.final_score;
        self.final_score_raw = patch.final_score_raw;
        self
    }

    pub fn with_placement(mut self, rank: Option<usize>, status: ShortlistStatus) -> Self {
        self.rank = rank;
        self.shortlist_status = status;
        self
    }

    /// Final score before display rounding.
    pub fn final_score_raw(&self) -> f64 {
        self.final_score_raw
    }

    pub fn has_consistency_issues(&self) -> bool {
        !self.consistency_flags.is_empty()
    }
}
