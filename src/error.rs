//! Structural failures of a single candidate evaluation.
//!
//! Data-quality gaps (unassessed skills, out-of-range numbers) are not errors; they
//! are clamped or recorded as notes on the record. Only inputs the pipeline cannot
//! attribute to anyone end up here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
}

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Reject blank identity fields; whitespace-only counts as blank.
pub(crate) fn require_field(value: &str, field: &'static str) -> ScoringResult<()> {
    if value.trim().is_empty() {
        Err(ScoringError::MissingField { field })
    } else {
        Ok(())
    }
}
