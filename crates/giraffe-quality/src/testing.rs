//! In-memory fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::audits::{
    AuditCompletedNotice, AuditId, AuditNotifier, AuditRepository, NotifyError, SanitationAudit,
};
use crate::branches::{Branch, BranchId, BranchRepository};
use crate::repository::RepositoryError;
use crate::reviews::{ManagerReview, ReviewId, ReviewRepository};

pub(crate) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}

#[derive(Default, Clone)]
pub(crate) struct MemoryBranches {
    records: Arc<Mutex<HashMap<BranchId, Branch>>>,
}

impl MemoryBranches {
    /// Seeds branches with ids starting at 1 in the given order.
    pub(crate) fn with_names(names: &[&str]) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.records.lock().expect("branch mutex poisoned");
            for (index, name) in names.iter().enumerate() {
                let id = BranchId(index as u64 + 1);
                guard.insert(
                    id,
                    Branch {
                        id,
                        name: (*name).to_string(),
                        location: None,
                        created_at: Utc::now(),
                    },
                );
            }
        }
        repository
    }
}

impl BranchRepository for MemoryBranches {
    fn insert(&self, branch: Branch) -> Result<Branch, RepositoryError> {
        let mut guard = self.records.lock().expect("branch mutex poisoned");
        if guard.contains_key(&branch.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(branch.id, branch.clone());
        Ok(branch)
    }

    fn fetch(&self, id: BranchId) -> Result<Option<Branch>, RepositoryError> {
        let guard = self.records.lock().expect("branch mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Branch>, RepositoryError> {
        let guard = self.records.lock().expect("branch mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct MemoryReviews {
    records: Arc<Mutex<HashMap<ReviewId, ManagerReview>>>,
}

impl ReviewRepository for MemoryReviews {
    fn insert(&self, review: ManagerReview) -> Result<ManagerReview, RepositoryError> {
        let mut guard = self.records.lock().expect("review mutex poisoned");
        if guard.contains_key(&review.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(review.id, review.clone());
        Ok(review)
    }

    fn update(&self, review: ManagerReview) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("review mutex poisoned");
        guard.insert(review.id, review);
        Ok(())
    }

    fn fetch(&self, id: ReviewId) -> Result<Option<ManagerReview>, RepositoryError> {
        let guard = self.records.lock().expect("review mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("review mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<ManagerReview>, RepositoryError> {
        let guard = self.records.lock().expect("review mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct MemoryAudits {
    records: Arc<Mutex<HashMap<AuditId, SanitationAudit>>>,
}

impl AuditRepository for MemoryAudits {
    fn insert(&self, audit: SanitationAudit) -> Result<SanitationAudit, RepositoryError> {
        let mut guard = self.records.lock().expect("audit mutex poisoned");
        if guard.contains_key(&audit.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(audit.id, audit.clone());
        Ok(audit)
    }

    fn update(&self, audit: SanitationAudit) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("audit mutex poisoned");
        guard.insert(audit.id, audit);
        Ok(())
    }

    fn fetch(&self, id: AuditId) -> Result<Option<SanitationAudit>, RepositoryError> {
        let guard = self.records.lock().expect("audit mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn delete(&self, id: AuditId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("audit mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<SanitationAudit>, RepositoryError> {
        let guard = self.records.lock().expect("audit mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<AuditCompletedNotice>>>,
}

impl MemoryNotifier {
    pub(crate) fn notices(&self) -> Vec<AuditCompletedNotice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl AuditNotifier for MemoryNotifier {
    fn audit_completed(&self, notice: AuditCompletedNotice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(crate) struct FailingNotifier;

impl AuditNotifier for FailingNotifier {
    fn audit_completed(&self, _notice: AuditCompletedNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp offline".to_string()))
    }
}

pub(crate) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl BranchRepository for UnavailableRepository {
    fn insert(&self, _branch: Branch) -> Result<Branch, RepositoryError> {
        offline()
    }

    fn fetch(&self, _id: BranchId) -> Result<Option<Branch>, RepositoryError> {
        offline()
    }

    fn all(&self) -> Result<Vec<Branch>, RepositoryError> {
        offline()
    }
}

impl ReviewRepository for UnavailableRepository {
    fn insert(&self, _review: ManagerReview) -> Result<ManagerReview, RepositoryError> {
        offline()
    }

    fn update(&self, _review: ManagerReview) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch(&self, _id: ReviewId) -> Result<Option<ManagerReview>, RepositoryError> {
        offline()
    }

    fn delete(&self, _id: ReviewId) -> Result<(), RepositoryError> {
        offline()
    }

    fn all(&self) -> Result<Vec<ManagerReview>, RepositoryError> {
        offline()
    }
}

impl AuditRepository for UnavailableRepository {
    fn insert(&self, _audit: SanitationAudit) -> Result<SanitationAudit, RepositoryError> {
        offline()
    }

    fn update(&self, _audit: SanitationAudit) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch(&self, _id: AuditId) -> Result<Option<SanitationAudit>, RepositoryError> {
        offline()
    }

    fn delete(&self, _id: AuditId) -> Result<(), RepositoryError> {
        offline()
    }

    fn all(&self) -> Result<Vec<SanitationAudit>, RepositoryError> {
        offline()
    }
}
