//! Score aggregation for manager reviews and the sanitation deduction model.
//!
//! Everything here is pure and synchronous. Aggregation tolerates missing
//! scores by returning `None`; only configuration and input errors surface as
//! [`ScoringError`].

pub mod aggregate;
pub mod deduction;
pub mod error;
pub mod lifecycle;
pub mod scorecard;
pub mod weights;

pub use aggregate::{
    aggregate, compute_group_score, compute_overall_score, round_to, weighted_average,
    CategoryBreakdown, GroupBreakdown, PartialGroupPolicy, ScoreBreakdown,
};
pub use deduction::{
    compute_audit_score, points_for_defect_level, total_deductions, DefectLevel, DefectLevelView,
    AUDIT_BASELINE,
};
pub use error::{ScoringError, WeightTableError};
pub use lifecycle::{LifecycleError, LinearLifecycle};
pub use scorecard::{CategoryScore, ScoreInput, Scorecard};
pub use weights::{CategoryWeight, GroupWeight, WeightEntry, WeightTable};
