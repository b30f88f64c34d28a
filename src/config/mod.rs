//! Runtime configuration (TOML file + env overrides).

pub mod scoring;

pub use scoring::{
    ExpectedScores, IntegrityConfig, ScoringConfig, SeverityMultipliers, SeverityThresholds,
    ShortlistConfig, SkillsConfig, WeightsConfig, DEFAULT_SCORING_CONFIG_PATH,
    ENV_ROUND_1_THRESHOLD, ENV_ROUND_2_THRESHOLD, ENV_SCORING_CONFIG_PATH,
};
