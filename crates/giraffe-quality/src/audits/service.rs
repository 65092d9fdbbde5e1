use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    non_blank, AuditCategoryUpdate, AuditCategoryView, AuditDetailView, AuditId,
    AuditListQuery, AuditStatus, AuditSummaryView, CreateAuditRequest, SanitationAudit,
    UpdateAuditRequest,
};
use super::notify::{AuditCompletedNotice, AuditNotifier, ScoreBand};
use super::repository::AuditRepository;
use super::stats::{self, BranchAuditStats, NetworkAuditStats, BRANCH_TOP_ISSUES};
use crate::branches::{Branch, BranchId, BranchRepository};
use crate::repository::RepositoryError;
use crate::scoring::{LifecycleError, LinearLifecycle, ScoringError};

/// Sanitation audit workflow: category capture, scoring and completion notices.
pub struct SanitationAuditService<S, B, N> {
    audits: Arc<S>,
    branches: Arc<B>,
    notifier: Arc<N>,
    sequence: AtomicU64,
    writes: Mutex<()>,
}

impl<S, B, N> SanitationAuditService<S, B, N>
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    pub fn new(audits: Arc<S>, branches: Arc<B>, notifier: Arc<N>) -> Self {
        let next = audits
            .all()
            .map(|stored| stored.iter().map(|audit| audit.id.0).max().unwrap_or(0))
            .unwrap_or(0);

        Self {
            audits,
            branches,
            notifier,
            sequence: AtomicU64::new(next + 1),
            writes: Mutex::new(()),
        }
    }

    pub fn create(
        &self,
        request: CreateAuditRequest,
    ) -> Result<AuditDetailView, AuditServiceError> {
        let auditor_name = request.auditor_name.trim().to_string();
        if auditor_name.is_empty() {
            return Err(AuditServiceError::EmptyAuditor);
        }
        let branch = self.branch(request.branch_id)?;

        let now = Utc::now();
        let mut seen = BTreeSet::new();
        let mut categories = Vec::with_capacity(request.categories.len());
        for input in request.categories {
            let category = input.into_category(now)?;
            if !seen.insert(category.category_key.clone()) {
                return Err(AuditServiceError::DuplicateCategory(category.category_key));
            }
            categories.push(category);
        }

        let audit = SanitationAudit {
            id: AuditId(self.sequence.fetch_add(1, Ordering::Relaxed)),
            branch_id: branch.id,
            auditor_name,
            accompanist_name: non_blank(request.accompanist_name),
            audit_date: request.audit_date,
            start_time: request.start_time.unwrap_or(now),
            end_time: None,
            status: AuditStatus::INITIAL,
            general_notes: non_blank(request.general_notes),
            equipment_issues: non_blank(request.equipment_issues),
            categories,
            signature_url: None,
            signed_at: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.audits.insert(audit)?;
        info!(
            audit_id = %stored.id,
            branch_id = %stored.branch_id,
            categories = stored.categories.len(),
            "sanitation audit created"
        );
        Ok(stored.detail_view(Some(&branch.name)))
    }

    /// Audits ordered by audit date, newest first, then paged.
    pub fn list(&self, query: AuditListQuery) -> Result<Vec<AuditSummaryView>, AuditServiceError> {
        let branches = self.branches.all()?;
        let mut audits: Vec<SanitationAudit> = self
            .audits
            .all()?
            .into_iter()
            .filter(|audit| query.branch_id.map_or(true, |id| audit.branch_id == id))
            .collect();
        sort_newest_first(&mut audits);

        Ok(audits
            .iter()
            .skip(query.skip)
            .take(query.limit)
            .map(|audit| audit.summary_view(branch_name(&branches, audit.branch_id)))
            .collect())
    }

    pub fn get(&self, id: AuditId) -> Result<AuditDetailView, AuditServiceError> {
        let audit = self.load(id)?;
        self.detail(&audit)
    }

    /// Applies detail edits and at most one forward status step. Entering
    /// `completed` stamps the end time and publishes a completion notice.
    pub fn update(
        &self,
        id: AuditId,
        request: UpdateAuditRequest,
    ) -> Result<AuditDetailView, AuditServiceError> {
        let writes = self.write_guard()?;
        let mut audit = self.load(id)?;
        if request.touches_details() {
            audit.status.ensure_editable()?;
        }

        let now = Utc::now();
        let previous = audit.status;
        if let Some(target) = request.status.filter(|target| *target != previous) {
            audit.status = previous.advance_to(target)?;
        }

        if let Some(end_time) = request.end_time {
            audit.end_time = Some(end_time);
        }
        if let Some(accompanist) = request.accompanist_name {
            audit.accompanist_name = non_blank(Some(accompanist));
        }
        if let Some(notes) = request.general_notes {
            audit.general_notes = non_blank(Some(notes));
        }
        if let Some(issues) = request.equipment_issues {
            audit.equipment_issues = non_blank(Some(issues));
        }
        if let Some(signature) = non_blank(request.signature_url) {
            audit.signature_url = Some(signature);
            audit.signed_at = Some(now);
        }

        let completed =
            previous != AuditStatus::Completed && audit.status == AuditStatus::Completed;
        if completed && audit.end_time.is_none() {
            audit.end_time = Some(now);
        }
        audit.updated_at = now;

        let branch = self.branches.fetch(audit.branch_id)?;
        self.audits.update(audit.clone())?;
        drop(writes);
        if audit.status != previous {
            info!(
                audit_id = %id,
                from = previous.label(),
                to = audit.status.label(),
                total_score = audit.total_score(),
                "sanitation audit status changed"
            );
        }

        if completed {
            self.notify_completed(&audit, branch.as_ref());
        }
        Ok(audit.detail_view(branch.as_ref().map(|branch| branch.name.as_str())))
    }

    pub fn update_category(
        &self,
        id: AuditId,
        category_key: &str,
        update: AuditCategoryUpdate,
    ) -> Result<AuditCategoryView, AuditServiceError> {
        let _writes = self.write_guard()?;
        let mut audit = self.load(id)?;
        audit.status.ensure_editable()?;

        let now = Utc::now();
        let category = audit
            .category_mut(category_key)
            .ok_or_else(|| AuditServiceError::CategoryNotFound {
                audit_id: id,
                category_key: category_key.to_string(),
            })?;
        update.apply(category, now)?;
        let view = category.to_view();

        audit.updated_at = now;
        self.audits.update(audit)?;
        debug!(
            audit_id = %id,
            category = category_key,
            deduction = view.deduction,
            "audit category updated"
        );
        Ok(view)
    }

    pub fn delete(&self, id: AuditId) -> Result<(), AuditServiceError> {
        let _writes = self.write_guard()?;
        let audit = self.load(id)?;
        audit.status.ensure_deletable()?;
        self.audits.delete(id)?;
        info!(audit_id = %id, "sanitation audit deleted");
        Ok(())
    }

    /// Statistics over the closed audits of one branch.
    pub fn branch_stats(&self, branch_id: BranchId) -> Result<BranchAuditStats, AuditServiceError> {
        let branch = self.branch(branch_id)?;
        let mut audits: Vec<SanitationAudit> = self
            .closed_audits()?
            .into_iter()
            .filter(|audit| audit.branch_id == branch_id)
            .collect();
        sort_newest_first(&mut audits);

        let refs: Vec<&SanitationAudit> = audits.iter().collect();
        Ok(stats::branch_stats(&branch, &refs, BRANCH_TOP_ISSUES))
    }

    pub fn network_stats(&self) -> Result<NetworkAuditStats, AuditServiceError> {
        let mut branches = self.branches.all()?;
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        let audits = self.closed_audits()?;
        Ok(stats::network_stats(&branches, &audits))
    }

    fn notify_completed(&self, audit: &SanitationAudit, branch: Option<&Branch>) {
        let total_score = audit.total_score();
        let notice = AuditCompletedNotice {
            audit_id: audit.id,
            branch_id: audit.branch_id,
            branch_name: branch
                .map(|branch| branch.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            audit_date: audit.audit_date,
            auditor_name: audit.auditor_name.clone(),
            accompanist_name: audit.accompanist_name.clone(),
            total_score,
            band: ScoreBand::from_score(total_score),
            summary: audit.deficiencies_summary(),
        };

        if let Err(err) = self.notifier.audit_completed(notice) {
            warn!(audit_id = %audit.id, error = %err, "audit completion notice not delivered");
        }
    }

    fn closed_audits(&self) -> Result<Vec<SanitationAudit>, AuditServiceError> {
        Ok(self
            .audits
            .all()?
            .into_iter()
            .filter(|audit| audit.status.is_closed())
            .collect())
    }

    fn branch(&self, id: BranchId) -> Result<Branch, AuditServiceError> {
        self.branches
            .fetch(id)?
            .ok_or(AuditServiceError::BranchNotFound(id))
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, RepositoryError> {
        self.writes
            .lock()
            .map_err(|_| RepositoryError::Unavailable("audit write lock poisoned".to_string()))
    }

    fn load(&self, id: AuditId) -> Result<SanitationAudit, AuditServiceError> {
        self.audits.fetch(id)?.ok_or(AuditServiceError::NotFound(id))
    }

    fn detail(&self, audit: &SanitationAudit) -> Result<AuditDetailView, AuditServiceError> {
        let branch = self.branches.fetch(audit.branch_id)?;
        Ok(audit.detail_view(branch.as_ref().map(|branch| branch.name.as_str())))
    }
}

fn sort_newest_first(audits: &mut [SanitationAudit]) {
    audits.sort_by(|a, b| (b.audit_date, b.created_at).cmp(&(a.audit_date, a.created_at)));
}

fn branch_name(branches: &[Branch], id: BranchId) -> Option<&str> {
    branches
        .iter()
        .find(|branch| branch.id == id)
        .map(|branch| branch.name.as_str())
}

/// Error raised by the sanitation audit service.
#[derive(Debug, thiserror::Error)]
pub enum AuditServiceError {
    #[error("auditor name must not be empty")]
    EmptyAuditor,
    #[error("category '{0}' appears more than once in the audit")]
    DuplicateCategory(String),
    #[error("audit {0} not found")]
    NotFound(AuditId),
    #[error("branch {0} not found")]
    BranchNotFound(BranchId),
    #[error("audit {audit_id} has no category '{category_key}'")]
    CategoryNotFound {
        audit_id: AuditId,
        category_key: String,
    },
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
