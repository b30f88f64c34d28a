// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod leaderboard;
pub mod model;
pub mod scoring;
pub mod shortlist;
pub mod skill_key;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::ScoringConfig;
pub use crate::error::{ScoringError, ScoringResult};
pub use crate::leaderboard::{
    CandidateFailure, CohortOutcome, CohortReport, Leaderboard, LeaderboardAggregator,
    LeaderboardEntry, LeaderboardPage, LeaderboardStatistics, Shortlist,
};
pub use crate::model::{
    CandidateInput, CandidateScoringRecord, ConsistencyFlag, JobInput, ProficiencyLevel,
    ResumeClaim, Severity, ShortlistStatus, SkillContribution, SkillScore, SkillWeight,
};
pub use crate::scoring::{ClaimAnalysis, ScoreBreakdown, ScoringPipeline};
pub use crate::shortlist::ShortlistMode;
