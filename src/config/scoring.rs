// src/config/scoring.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::{debug, warn};

use crate::model::{ProficiencyLevel, Severity};
use crate::shortlist::ShortlistMode;
use crate::skill_key::SkillAliases;

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";

pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";
pub const ENV_ROUND_1_THRESHOLD: &str = "SCORING_ROUND_1_THRESHOLD";
pub const ENV_ROUND_2_THRESHOLD: &str = "SCORING_ROUND_2_THRESHOLD";

fn default_round_2_threshold() -> f64 {
    85.0
}
fn default_round_1_threshold() -> f64 {
    70.0
}
fn default_round_2_percentile() -> u32 {
    10
}
fn default_round_1_percentile() -> u32 {
    30
}
fn default_penalty_cap() -> f64 {
    25.0
}
fn default_consistency_bonus() -> f64 {
    5.0
}
fn default_sum_tolerance() -> f64 {
    0.01
}
fn default_suggestion_similarity() -> f64 {
    0.88
}

/// Complete tuning surface of the pipeline. `Default` reproduces the reference
/// constants; a TOML file only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub shortlist: ShortlistConfig,
    #[serde(default)]
    pub integrity: IntegrityConfig,
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub skills: SkillsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistConfig {
    #[serde(default = "default_round_2_threshold")]
    pub round_2_threshold: f64,
    #[serde(default = "default_round_1_threshold")]
    pub round_1_threshold: f64,
    /// Top N percent of the cohort that reaches round 2 regardless of score.
    #[serde(default = "default_round_2_percentile")]
    pub round_2_percentile: u32,
    #[serde(default = "default_round_1_percentile")]
    pub round_1_percentile: u32,
    /// Batch placement mode; the CLI `--mode` flag overrides it.
    #[serde(default)]
    pub mode: ShortlistMode,
}

impl Default for ShortlistConfig {
    fn default() -> Self {
        Self {
            round_2_threshold: default_round_2_threshold(),
            round_1_threshold: default_round_1_threshold(),
            round_2_percentile: default_round_2_percentile(),
            round_1_percentile: default_round_1_percentile(),
            mode: ShortlistMode::default(),
        }
    }
}

/// Expected minimum assessment score per claimed level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedScores {
    pub expert: f64,
    pub advanced: f64,
    pub intermediate: f64,
    pub beginner: f64,
    pub unknown: f64,
}

impl Default for ExpectedScores {
    fn default() -> Self {
        Self {
            expert: 80.0,
            advanced: 70.0,
            intermediate: 50.0,
            beginner: 30.0,
            unknown: 50.0,
        }
    }
}

/// Minimum discrepancy (points) for each severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            high: 40.0,
            medium: 20.0,
            low: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityMultipliers {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for SeverityMultipliers {
    fn default() -> Self {
        Self {
            high: 1.5,
            medium: 1.0,
            low: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityConfig {
    #[serde(default)]
    pub expected: ExpectedScores,
    #[serde(default)]
    pub severity: SeverityThresholds,
    #[serde(default)]
    pub multipliers: SeverityMultipliers,
    /// Maximum penalty a single skill can cost.
    #[serde(default = "default_penalty_cap")]
    pub penalty_cap: f64,
    /// Added when claims were checked and none were flagged.
    #[serde(default = "default_consistency_bonus")]
    pub consistency_bonus: f64,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            expected: ExpectedScores::default(),
            severity: SeverityThresholds::default(),
            multipliers: SeverityMultipliers::default(),
            penalty_cap: default_penalty_cap(),
            consistency_bonus: default_consistency_bonus(),
        }
    }
}

impl IntegrityConfig {
    pub fn expected_for(&self, level: ProficiencyLevel) -> f64 {
        match level {
            ProficiencyLevel::Expert => self.expected.expert,
            ProficiencyLevel::Advanced => self.expected.advanced,
            ProficiencyLevel::Intermediate => self.expected.intermediate,
            ProficiencyLevel::Beginner => self.expected.beginner,
            ProficiencyLevel::Unknown => self.expected.unknown,
        }
    }

    pub fn multiplier_for(&self, severity: Severity) -> f64 {
        match severity {
            Severity::High => self.multipliers.high,
            Severity::Medium => self.multipliers.medium,
            Severity::Low => self.multipliers.low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    /// Rescale job weights to sum to 1.0 before scoring. Off by default.
    #[serde(default)]
    pub normalize: bool,
    /// Allowed |Σweights − 1| before a warning is logged.
    #[serde(default = "default_sum_tolerance")]
    pub sum_tolerance: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            normalize: false,
            sum_tolerance: default_sum_tolerance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Alternative spelling → canonical skill name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Jaro-Winkler similarity needed to suggest a near-miss skill name.
    #[serde(default = "default_suggestion_similarity")]
    pub suggestion_similarity: f64,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            suggestion_similarity: default_suggestion_similarity(),
        }
    }
}

impl SkillsConfig {
    pub fn alias_table(&self) -> SkillAliases {
        SkillAliases::from_pairs(self.aliases.iter())
    }
}

impl ScoringConfig {
    /// Parse and sanitize a TOML document. No env overrides.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ScoringConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    /// Load configuration from an explicit TOML file, then apply env overrides.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading scoring config from {}", path.display()))?;
        let cfg = Self::from_toml_str(&data)
            .with_context(|| format!("parsing scoring config {}", path.display()))?;
        debug!(path = %path.display(), "scoring config loaded");
        Ok(cfg.with_env_overrides())
    }

    /// Resolve configuration using env var + fallbacks:
    /// 1) $SCORING_CONFIG_PATH (must exist)
    /// 2) config/scoring.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_SCORING_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_SCORING_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            return Self::load_from_file(&pb);
        }
        let fallback = PathBuf::from(DEFAULT_SCORING_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from_file(&fallback);
        }
        Ok(Self::default().with_env_overrides())
    }

    /// Threshold overrides from the environment; invalid values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = parse_threshold_env(env::var(ENV_ROUND_1_THRESHOLD).ok()) {
            self.shortlist.round_1_threshold = v;
        }
        if let Some(v) = parse_threshold_env(env::var(ENV_ROUND_2_THRESHOLD).ok()) {
            self.shortlist.round_2_threshold = v;
        }
        self.sanitized()
    }

    /// Clamp every knob into a usable range.
    pub fn sanitized(mut self) -> Self {
        let s = &mut self.shortlist;
        if !s.round_2_threshold.is_finite() {
            s.round_2_threshold = default_round_2_threshold();
        }
        if !s.round_1_threshold.is_finite() {
            s.round_1_threshold = default_round_1_threshold();
        }
        s.round_2_threshold = s.round_2_threshold.clamp(0.0, 100.0);
        s.round_1_threshold = s.round_1_threshold.clamp(0.0, 100.0);
        if s.round_1_threshold > s.round_2_threshold {
            warn!(
                round_1 = s.round_1_threshold,
                round_2 = s.round_2_threshold,
                "round thresholds inverted; swapping"
            );
            std::mem::swap(&mut s.round_1_threshold, &mut s.round_2_threshold);
        }
        s.round_2_percentile = s.round_2_percentile.min(100);
        s.round_1_percentile = s.round_1_percentile.min(100);
        if s.round_2_percentile > s.round_1_percentile {
            std::mem::swap(&mut s.round_2_percentile, &mut s.round_1_percentile);
        }

        let i = &mut self.integrity;
        if !(i.penalty_cap.is_finite() && i.penalty_cap >= 0.0) {
            i.penalty_cap = default_penalty_cap();
        }
        if !(i.consistency_bonus.is_finite() && i.consistency_bonus >= 0.0) {
            i.consistency_bonus = default_consistency_bonus();
        }
        let bands = SeverityThresholds::default();
        for (b, d) in [
            (&mut i.severity.high, bands.high),
            (&mut i.severity.medium, bands.medium),
            (&mut i.severity.low, bands.low),
        ] {
            if !(b.is_finite() && *b >= 0.0) {
                *b = d;
            }
        }
        let mut sorted = [i.severity.low, i.severity.medium, i.severity.high];
        sorted.sort_by(f64::total_cmp);
        if sorted != [i.severity.low, i.severity.medium, i.severity.high] {
            warn!(
                low = i.severity.low,
                medium = i.severity.medium,
                high = i.severity.high,
                "severity bands out of order; sorting"
            );
            [i.severity.low, i.severity.medium, i.severity.high] = sorted;
        }

        let defaults = SeverityMultipliers::default();
        for (m, d) in [
            (&mut i.multipliers.high, defaults.high),
            (&mut i.multipliers.medium, defaults.medium),
            (&mut i.multipliers.low, defaults.low),
        ] {
            if !(m.is_finite() && *m >= 0.0) {
                *m = d;
            }
        }
        for e in [
            &mut i.expected.expert,
            &mut i.expected.advanced,
            &mut i.expected.intermediate,
            &mut i.expected.beginner,
            &mut i.expected.unknown,
        ] {
            *e = if e.is_finite() { (*e).clamp(0.0, 100.0) } else { 0.0 };
        }

        if !(self.weights.sum_tolerance.is_finite() && self.weights.sum_tolerance >= 0.0) {
            self.weights.sum_tolerance = default_sum_tolerance();
        }
        let sim = self.skills.suggestion_similarity;
        self.skills.suggestion_similarity = if sim.is_finite() {
            sim.clamp(0.0, 1.0)
        } else {
            default_suggestion_similarity()
        };
        self
    }
}

// parse optional float env and clamp to <0.0..=100.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
}
