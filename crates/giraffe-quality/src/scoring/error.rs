/// Errors raised by the scoring core.
///
/// Incomplete data is not an error for aggregation (it yields `None`); these
/// variants cover strict checks, bad input and broken configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("category '{category}' has not been scored yet")]
    MissingCategoryScore { category: String },
    #[error("unrecognized defect level '{0}'")]
    InvalidDefectLevel(String),
    #[error("audit category key must not be empty")]
    EmptyCategoryKey,
    #[error("category '{0}' is not part of this score sheet")]
    UnknownCategory(String),
    #[error("score {score} for '{category}' must be between 0 and 100")]
    ScoreOutOfRange { category: String, score: i64 },
    #[error("weight table is inconsistent: {0}")]
    WeightTableInconsistency(#[from] WeightTableError),
}

/// Construction-time violations of the weight table invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightTableError {
    #[error("group '{group}' declares {declared}% but its categories sum to {actual}%")]
    GroupSumMismatch {
        group: String,
        declared: f64,
        actual: f64,
    },
    #[error("group weights sum to {0}%, expected 100%")]
    TotalMismatch(f64),
    #[error("category '{0}' appears more than once")]
    DuplicateCategory(String),
    #[error("group '{0}' has no categories")]
    EmptyGroup(String),
    #[error("weight {weight} for '{key}' is outside 0-100")]
    WeightOutOfRange { key: String, weight: f64 },
}
