use giraffe_quality::audits::{
    AuditCompletedNotice, AuditId, AuditNotifier, AuditRepository, NotifyError, SanitationAudit,
};
use giraffe_quality::branches::{
    Branch, BranchDirectory, BranchError, BranchId, BranchRepository, NewBranch,
};
use giraffe_quality::repository::RepositoryError;
use giraffe_quality::reviews::{ManagerReview, ReviewId, ReviewRepository};
use giraffe_quality::scoring::{PartialGroupPolicy, WeightTable};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) weights: Arc<WeightTable>,
    pub(crate) policy: PartialGroupPolicy,
}

fn lock<T>(records: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    records
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryBranchRepository {
    records: Arc<Mutex<HashMap<BranchId, Branch>>>,
}

impl BranchRepository for InMemoryBranchRepository {
    fn insert(&self, branch: Branch) -> Result<Branch, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&branch.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(branch.id, branch.clone());
        Ok(branch)
    }

    fn fetch(&self, id: BranchId) -> Result<Option<Branch>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Branch>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewRepository {
    records: Arc<Mutex<HashMap<ReviewId, ManagerReview>>>,
}

impl ReviewRepository for InMemoryReviewRepository {
    fn insert(&self, review: ManagerReview) -> Result<ManagerReview, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&review.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(review.id, review.clone());
        Ok(review)
    }

    fn update(&self, review: ManagerReview) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&review.id) {
            guard.insert(review.id, review);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: ReviewId) -> Result<Option<ManagerReview>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(&id).cloned())
    }

    fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<ManagerReview>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditRepository {
    records: Arc<Mutex<HashMap<AuditId, SanitationAudit>>>,
}

impl AuditRepository for InMemoryAuditRepository {
    fn insert(&self, audit: SanitationAudit) -> Result<SanitationAudit, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&audit.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(audit.id, audit.clone());
        Ok(audit)
    }

    fn update(&self, audit: SanitationAudit) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&audit.id) {
            guard.insert(audit.id, audit);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: AuditId) -> Result<Option<SanitationAudit>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(&id).cloned())
    }

    fn delete(&self, id: AuditId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<SanitationAudit>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.values().cloned().collect())
    }
}

/// Logs completion notices and keeps them for inspection. Stands in for the
/// e-mail adapter until one is wired up.
#[derive(Default, Clone)]
pub(crate) struct LoggingAuditNotifier {
    events: Arc<Mutex<Vec<AuditCompletedNotice>>>,
}

impl AuditNotifier for LoggingAuditNotifier {
    fn audit_completed(&self, notice: AuditCompletedNotice) -> Result<(), NotifyError> {
        info!(
            audit_id = %notice.audit_id,
            branch = %notice.branch_name,
            total_score = notice.total_score,
            band = ?notice.band,
            "sanitation audit completed"
        );
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotifyError::Transport("notice log poisoned".to_string()))?;
        guard.push(notice);
        Ok(())
    }
}

#[cfg(test)]
impl LoggingAuditNotifier {
    pub(crate) fn events(&self) -> Vec<AuditCompletedNotice> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

/// Creates the configured branches, skipping names that already exist.
pub(crate) fn seed_branches<B>(
    directory: &BranchDirectory<B>,
    names: &[String],
) -> Result<usize, BranchError>
where
    B: BranchRepository + 'static,
{
    let mut created = 0;
    for name in names {
        match directory.create(NewBranch {
            name: name.clone(),
            location: None,
        }) {
            Ok(_) => created += 1,
            Err(BranchError::DuplicateName(_)) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(created)
}
