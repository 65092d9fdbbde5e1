use chrono::NaiveDate;
use serde::Serialize;

use super::domain::AuditId;
use crate::branches::BranchId;

/// Colour band used when reporting an audit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Good,
    Warning,
    Critical,
}

impl ScoreBand {
    pub fn from_score(score: u32) -> Self {
        match score {
            85.. => Self::Good,
            70..=84 => Self::Warning,
            _ => Self::Critical,
        }
    }
}

/// Payload sent to the branch manager and HQ when an audit is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditCompletedNotice {
    pub audit_id: AuditId,
    pub branch_id: BranchId,
    pub branch_name: String,
    pub audit_date: NaiveDate,
    pub auditor_name: String,
    pub accompanist_name: Option<String>,
    pub total_score: u32,
    pub band: ScoreBand,
    pub summary: String,
}

/// Outbound hook for audit completion (e-mail or chat adapters).
pub trait AuditNotifier: Send + Sync {
    fn audit_completed(&self, notice: AuditCompletedNotice) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
