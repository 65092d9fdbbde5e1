//! HQ sanitation audits scored by defect deductions from a 100 point baseline.

pub mod domain;
pub mod notify;
pub mod repository;
pub mod router;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use domain::{
    summarize_deficiencies, AuditCategory, AuditCategoryInput, AuditCategoryUpdate,
    AuditCategoryView, AuditDetailView, AuditId, AuditListQuery, AuditStatus, AuditSummaryView,
    CreateAuditRequest, SanitationAudit, UpdateAuditRequest, NO_DEFICIENCIES,
};
pub use notify::{AuditCompletedNotice, AuditNotifier, NotifyError, ScoreBand};
pub use repository::AuditRepository;
pub use router::audit_router;
pub use service::{AuditServiceError, SanitationAuditService};
pub use stats::{BranchAuditStats, BranchScore, IssueCount, NetworkAuditStats, ScoreTrend};
