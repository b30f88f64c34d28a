//! Weighted score: Σ(score × weight) over the job's weighted skills.
//!
//! Every weight entry yields exactly one `SkillContribution`, assessed or not, so the
//! breakdown always mirrors the job's requirement list.

use crate::model::{SkillContribution, SkillWeight};
use crate::skill_key::SkillIndex;

use super::{clamp_score, clamp_weight, round_to};

/// Note attached to a contribution whose skill was never assessed.
pub const NOT_ASSESSED_NOTE: &str = "skill not assessed";

/// Patch produced by the weighted stage.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedOutcome {
    /// Clamped to `[0, 100]`, two decimals.
    pub weighted_score: f64,
    pub skill_contributions: Vec<SkillContribution>,
    /// Non-fatal data-quality notes, appended to `processing_errors`.
    pub notes: Vec<String>,
}

/// Compute the weighted score of one candidate against one job's weights.
///
/// Scores are clamped to `[0, 100]` and weights to `[0, 1]` as they are read.
/// A weighted skill without a matching score counts as 0 and leaves a note.
pub fn calculate(
    weights: &[SkillWeight],
    index: &SkillIndex<'_>,
    suggestion_similarity: f64,
) -> WeightedOutcome {
    let mut raw_sum = 0.0f64;
    let mut rows: Vec<(SkillContribution, f64)> = Vec::with_capacity(weights.len());
    let mut notes = Vec::new();

    for entry in weights {
        let weight = clamp_weight(entry.weight);
        match index.score_of(&entry.skill) {
            Some(raw) => {
                let score = clamp_score(raw);
                let contribution = score * weight;
                raw_sum += contribution;
                rows.push((
                    SkillContribution {
                        skill: entry.skill.clone(),
                        score,
                        weight,
                        contribution: round_to(contribution, 2),
                        percentage_of_total: 0.0,
                        note: None,
                    },
                    contribution,
                ));
            }
            None => {
                rows.push((
                    SkillContribution {
                        skill: entry.skill.clone(),
                        score: 0.0,
                        weight,
                        contribution: 0.0,
                        percentage_of_total: 0.0,
                        note: Some(NOT_ASSESSED_NOTE.to_string()),
                    },
                    0.0,
                ));
                notes.push(missing_skill_note(&entry.skill, index, suggestion_similarity));
            }
        }
    }

    if raw_sum > 0.0 {
        for (c, exact) in rows.iter_mut() {
            c.percentage_of_total = round_to(*exact / raw_sum * 100.0, 1);
        }
    }

    WeightedOutcome {
        weighted_score: round_to(raw_sum.clamp(0.0, 100.0), 2),
        skill_contributions: rows.into_iter().map(|(c, _)| c).collect(),
        notes,
    }
}

fn missing_skill_note(skill: &str, index: &SkillIndex<'_>, min_similarity: f64) -> String {
    match index.closest(skill, min_similarity) {
        Some(near) => format!(
            "Skill '{skill}' in requirement set but not assessed (closest assessed skill: '{near}')"
        ),
        None => format!("Skill '{skill}' in requirement set but not assessed"),
    }
}

/// Sum of the (clamped) weights.
pub fn weight_sum(weights: &[SkillWeight]) -> f64 {
    weights.iter().map(|w| clamp_weight(w.weight)).sum()
}

/// Rescale weights so they sum to 1.0. All-zero weights become an equal split.
///
/// Only applied when configured; see `WeightsConfig::normalize`.
pub fn normalize_weights(weights: &[SkillWeight]) -> Vec<SkillWeight> {
    if weights.is_empty() {
        return Vec::new();
    }
    let total = weight_sum(weights);
    if total <= 0.0 {
        let equal = 1.0 / weights.len() as f64;
        return weights
            .iter()
            .map(|w| SkillWeight {
                weight: equal,
                ..w.clone()
            })
            .collect();
    }
    weights
        .iter()
        .map(|w| SkillWeight {
            weight: clamp_weight(w.weight) / total,
            ..w.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SkillScore;
    use crate::skill_key::SkillAliases;

    const SIM: f64 = 0.88;

    fn run(weights: &[SkillWeight], scores: &[SkillScore]) -> WeightedOutcome {
        let aliases = SkillAliases::default();
        let idx = SkillIndex::build(scores, &aliases);
        calculate(weights, &idx, SIM)
    }

    #[test]
    fn two_skill_example() {
        let out = run(
            &[SkillWeight::new("React", 0.6), SkillWeight::new("Python", 0.4)],
            &[SkillScore::new("react", 90.0), SkillScore::new("PYTHON", 80.0)],
        );
        assert!((out.weighted_score - 86.0).abs() < 1e-9);
        assert!(out.notes.is_empty());
        assert_eq!(out.skill_contributions.len(), 2);
        assert!((out.skill_contributions[0].contribution - 54.0).abs() < 1e-9);
        assert!((out.skill_contributions[0].percentage_of_total - 62.8).abs() < 1e-9);
        assert!((out.skill_contributions[1].percentage_of_total - 37.2).abs() < 1e-9);
    }

    #[test]
    fn unassessed_skill_scores_zero_and_leaves_note() {
        let out = run(
            &[SkillWeight::new("Rust", 0.5), SkillWeight::new("Kubernetes", 0.5)],
            &[SkillScore::new("Rust", 80.0)],
        );
        assert!((out.weighted_score - 40.0).abs() < 1e-9);
        let k8s = &out.skill_contributions[1];
        assert_eq!(k8s.score, 0.0);
        assert_eq!(k8s.contribution, 0.0);
        assert_eq!(k8s.note.as_deref(), Some(NOT_ASSESSED_NOTE));
        assert_eq!(out.notes.len(), 1);
        assert!(out.notes[0].contains("'Kubernetes'"));
        assert!(!out.notes[0].contains("closest"));
    }

    #[test]
    fn near_miss_spelling_is_suggested() {
        let out = run(
            &[SkillWeight::new("NodeJS", 1.0)],
            &[SkillScore::new("Node.js", 70.0)],
        );
        assert_eq!(out.weighted_score, 0.0);
        assert!(out.notes[0].contains("closest assessed skill: 'Node.js'"));
    }

    #[test]
    fn empty_weights_are_a_zero_result() {
        let out = run(&[], &[SkillScore::new("Rust", 99.0)]);
        assert_eq!(out.weighted_score, 0.0);
        assert!(out.skill_contributions.is_empty());
        assert!(out.notes.is_empty());
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let out = run(
            &[SkillWeight::new("A", 3.0), SkillWeight::new("B", -1.0)],
            &[SkillScore::new("A", 250.0), SkillScore::new("B", f64::NAN)],
        );
        assert_eq!(out.weighted_score, 100.0);
        assert_eq!(out.skill_contributions[0].score, 100.0);
        assert_eq!(out.skill_contributions[0].weight, 1.0);
        assert_eq!(out.skill_contributions[1].weight, 0.0);
        assert_eq!(out.skill_contributions[1].score, 0.0);
    }

    #[test]
    fn overweighted_job_is_capped_at_100() {
        let out = run(
            &[SkillWeight::new("A", 0.8), SkillWeight::new("B", 0.8)],
            &[SkillScore::new("A", 90.0), SkillScore::new("B", 90.0)],
        );
        assert_eq!(out.weighted_score, 100.0);
        let pct: f64 = out.skill_contributions.iter().map(|c| c.percentage_of_total).sum();
        assert!((pct - 100.0).abs() < 0.11);
    }

    #[test]
    fn normalize_rescales_and_splits_zero() {
        let n = normalize_weights(&[SkillWeight::new("A", 2.0), SkillWeight::new("B", 0.5)]);
        // clamped to 1.0 and 0.5 before rescaling
        assert!((n[0].weight - 2.0 / 3.0).abs() < 1e-9);
        assert!((n[1].weight - 1.0 / 3.0).abs() < 1e-9);

        let z = normalize_weights(&[SkillWeight::new("A", 0.0), SkillWeight::new("B", 0.0)]);
        assert!(z.iter().all(|w| (w.weight - 0.5).abs() < 1e-9));
        assert!(normalize_weights(&[]).is_empty());
    }
}
