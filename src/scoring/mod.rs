// src/scoring/mod.rs
//! Per-candidate scoring pipeline: weighted → integrity → final.
//!
//! Each stage is a pure function returning a patch that is merged into a fresh
//! `CandidateScoringRecord`. No stage reads global state; the pipeline only carries
//! configuration.

pub mod final_score;
pub mod integrity;
pub mod weighted;

use std::borrow::Cow;

use tracing::{debug, debug_span, warn};

use crate::config::ScoringConfig;
use crate::error::{require_field, ScoringResult};
use crate::model::{CandidateInput, CandidateScoringRecord, JobInput};
use crate::shortlist;
use crate::skill_key::{SkillAliases, SkillIndex};
use crate::telemetry;

pub use final_score::{FinalOutcome, ScoreBreakdown};
pub use integrity::{ClaimAnalysis, IntegrityOutcome};
pub use weighted::{normalize_weights, WeightedOutcome};

/// Stateless scoring pipeline bound to one configuration.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    config: ScoringConfig,
    aliases: SkillAliases,
}

impl Default for ScoringPipeline {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl ScoringPipeline {
    pub fn new(config: ScoringConfig) -> Self {
        let aliases = config.skills.alias_table();
        Self { config, aliases }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Job as the stages will see it: weights normalized when configured, and a
    /// warning when they do not sum to 1.0.
    pub fn prepare_job<'a>(&self, job: &'a JobInput) -> Cow<'a, JobInput> {
        let sum = weighted::weight_sum(&job.skill_weights);
        let off = !job.skill_weights.is_empty()
            && (sum - 1.0).abs() > self.config.weights.sum_tolerance;

        if self.config.weights.normalize && off {
            debug!(job_id = %job.job_id, sum, "normalizing skill weights");
            return Cow::Owned(JobInput {
                skill_weights: normalize_weights(&job.skill_weights),
                ..job.clone()
            });
        }
        if off {
            warn!(
                job_id = %job.job_id,
                sum,
                "skill weights do not sum to 1.0; scores are not comparable across jobs"
            );
        }
        Cow::Borrowed(job)
    }

    /// Run weighted → integrity → final for one candidate. The record comes back
    /// `pending` and unranked; shortlisting is a separate pass.
    pub fn score(
        &self,
        job: &JobInput,
        candidate: &CandidateInput,
    ) -> ScoringResult<CandidateScoringRecord> {
        let job = self.prepare_job(job);
        self.score_prepared(&job, candidate)
    }

    /// `score` for a job that already went through `prepare_job`.
    pub(crate) fn score_prepared(
        &self,
        job: &JobInput,
        candidate: &CandidateInput,
    ) -> ScoringResult<CandidateScoringRecord> {
        let id = telemetry::anon_id(&candidate.candidate_id);
        let _span = debug_span!("score_candidate", candidate = %id).entered();

        if let Err(e) = require_field(&job.job_id, "job_id")
            .and_then(|_| require_field(&candidate.candidate_id, "candidate_id"))
        {
            telemetry::record_failure();
            warn!(candidate = %id, error = %e, "candidate rejected before scoring");
            return Err(e);
        }

        let index = SkillIndex::build(&candidate.skill_scores, &self.aliases);

        let w = weighted::calculate(
            &job.skill_weights,
            &index,
            self.config.skills.suggestion_similarity,
        );
        debug!(weighted = w.weighted_score, notes = w.notes.len(), "weighted stage");

        let i = integrity::check(&candidate.resume_claims, &index, &self.config.integrity);
        debug!(
            integrity = i.integrity_score,
            checked = i.skills_checked,
            flags = i.consistency_flags.len(),
            "integrity stage"
        );

        let f = final_score::combine(w.weighted_score, i.integrity_score);
        debug!(final_score = f.final_score, "final stage");

        let record = CandidateScoringRecord::new(job, candidate)
            .with_weighted(w)
            .with_integrity(i)
            .with_final(f);

        telemetry::record_scored(&record);
        Ok(record)
    }

    /// Single-candidate evaluation: score, then place by absolute thresholds.
    pub fn evaluate(
        &self,
        job: &JobInput,
        candidate: &CandidateInput,
    ) -> ScoringResult<CandidateScoringRecord> {
        let record = self.score(job, candidate)?;
        let status = shortlist::assign_absolute(record.final_score, &self.config.shortlist);
        telemetry::record_assignment(status);
        Ok(record.with_placement(None, status))
    }
}

/// Scores outside `[0, 100]` are clamped; NaN/∞ count as 0.
pub(crate) fn clamp_score(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Weights outside `[0, 1]` are clamped; NaN/∞ count as 0.
pub(crate) fn clamp_weight(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub(crate) fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round() / f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoringError;
    use crate::model::{ProficiencyLevel, ResumeClaim, ShortlistStatus, SkillScore, SkillWeight};

    fn job() -> JobInput {
        JobInput::new("job-1", "Frontend Engineer")
            .with_weight(SkillWeight::new("React", 0.6))
            .with_weight(SkillWeight::new("Python", 0.4))
    }

    #[test]
    fn full_pipeline_strong_honest_candidate() {
        let cand = CandidateInput::new("c-1", "Ada")
            .with_score(SkillScore::new("React", 90.0))
            .with_score(SkillScore::new("Python", 80.0));
        let rec = ScoringPipeline::default().evaluate(&job(), &cand).unwrap();
        assert_eq!(rec.weighted_score, 86.0);
        assert_eq!(rec.integrity_score, 100.0);
        assert_eq!(rec.final_score, 86.0);
        assert_eq!(rec.shortlist_status, ShortlistStatus::Round2);
        assert_eq!(rec.rank, None);
        assert!(rec.processing_errors.is_empty());
    }

    #[test]
    fn inflated_claim_discounts_final_score() {
        let cand = CandidateInput::new("c-2", "Bob")
            .with_score(SkillScore::new("React", 90.0))
            .with_score(SkillScore::new("Python", 40.0))
            .with_claim(ResumeClaim::new("python", ProficiencyLevel::Expert));
        let rec = ScoringPipeline::default().score(&job(), &cand).unwrap();
        // 0.6*90 + 0.4*40 = 70; integrity 75 → 52.5
        assert_eq!(rec.weighted_score, 70.0);
        assert_eq!(rec.integrity_score, 75.0);
        assert_eq!(rec.final_score, 52.5);
        assert_eq!(rec.shortlist_status, ShortlistStatus::Pending);
        assert!(rec.has_consistency_issues());
    }

    #[test]
    fn missing_identity_is_a_structural_error() {
        let cand = CandidateInput::new("   ", "Nobody");
        let err = ScoringPipeline::default().score(&job(), &cand).unwrap_err();
        assert_eq!(
            err,
            ScoringError::MissingField {
                field: "candidate_id"
            }
        );

        let mut anonymous_job = job();
        anonymous_job.job_id.clear();
        let cand = CandidateInput::new("c-1", "Ada");
        assert!(ScoringPipeline::default().score(&anonymous_job, &cand).is_err());
    }

    #[test]
    fn weights_are_left_alone_unless_normalization_is_enabled() {
        let skewed = JobInput::new("job-2", "Data")
            .with_weight(SkillWeight::new("SQL", 0.5))
            .with_weight(SkillWeight::new("Python", 0.25));
        let cand = CandidateInput::new("c-3", "Cy")
            .with_score(SkillScore::new("SQL", 80.0))
            .with_score(SkillScore::new("Python", 80.0));

        let plain = ScoringPipeline::default().score(&skewed, &cand).unwrap();
        assert_eq!(plain.weighted_score, 60.0);

        let mut cfg = ScoringConfig::default();
        cfg.weights.normalize = true;
        let normalized = ScoringPipeline::new(cfg).score(&skewed, &cand).unwrap();
        assert_eq!(normalized.weighted_score, 80.0);
        let sum: f64 = normalized.skill_weights.iter().map(|w| w.weight).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn configured_aliases_bridge_spellings() {
        let mut cfg = ScoringConfig::default();
        cfg.skills
            .aliases
            .insert("ReactJS".to_string(), "React".to_string());
        let cand = CandidateInput::new("c-4", "Di")
            .with_score(SkillScore::new("reactjs", 90.0))
            .with_score(SkillScore::new("Python", 80.0));
        let rec = ScoringPipeline::new(cfg).score(&job(), &cand).unwrap();
        assert_eq!(rec.weighted_score, 86.0);
        assert!(rec.processing_errors.is_empty());
    }

    #[test]
    fn round_to_behaves() {
        assert_eq!(round_to(1.005_f64 * 1000.0, 0), 1005.0);
        assert_eq!(round_to(62.790_697, 1), 62.8);
        assert_eq!(round_to(25.920_741, 2), 25.92);
    }
}
