//! In-memory repositories shared by the integration suites.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use giraffe_quality::audits::{
    AuditCompletedNotice, AuditId, AuditNotifier, AuditRepository, NotifyError, SanitationAudit,
};
use giraffe_quality::branches::{Branch, BranchId, BranchRepository};
use giraffe_quality::repository::RepositoryError;
use giraffe_quality::reviews::{ManagerReview, ReviewId, ReviewRepository};
use giraffe_quality::scoring::ScoreInput;

#[derive(Default)]
pub struct Branches {
    records: Mutex<HashMap<BranchId, Branch>>,
}

impl Branches {
    pub fn with_names(names: &[&str]) -> Self {
        let records = names
            .iter()
            .zip(1u64..)
            .map(|(name, id)| {
                (
                    BranchId(id),
                    Branch {
                        id: BranchId(id),
                        name: (*name).to_string(),
                        location: None,
                        created_at: Utc::now(),
                    },
                )
            })
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }
}

impl BranchRepository for Branches {
    fn insert(&self, branch: Branch) -> Result<Branch, RepositoryError> {
        let mut guard = self.records.lock().expect("branch mutex poisoned");
        if guard.contains_key(&branch.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(branch.id, branch.clone());
        Ok(branch)
    }

    fn fetch(&self, id: BranchId) -> Result<Option<Branch>, RepositoryError> {
        Ok(self.records.lock().expect("branch mutex poisoned").get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Branch>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("branch mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct Reviews {
    records: Mutex<HashMap<ReviewId, ManagerReview>>,
}

impl ReviewRepository for Reviews {
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
        match guard.get_mut(&review.id) {
            Some(slot) => {
                *slot = review;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: ReviewId) -> Result<Option<ManagerReview>, RepositoryError> {
        Ok(self.records.lock().expect("review mutex poisoned").get(&id).cloned())
    }

    fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("review mutex poisoned")
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<ManagerReview>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("review mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct Audits {
    records: Mutex<HashMap<AuditId, SanitationAudit>>,
}

impl AuditRepository for Audits {
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
        match guard.get_mut(&audit.id) {
            Some(slot) => {
                *slot = audit;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: AuditId) -> Result<Option<SanitationAudit>, RepositoryError> {
        Ok(self.records.lock().expect("audit mutex poisoned").get(&id).cloned())
    }

    fn delete(&self, id: AuditId) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("audit mutex poisoned")
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<SanitationAudit>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("audit mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct Notices {
    pub sent: Mutex<Vec<AuditCompletedNotice>>,
}

impl AuditNotifier for Notices {
    fn audit_completed(&self, notice: AuditCompletedNotice) -> Result<(), NotifyError> {
        self.sent.lock().expect("notice mutex poisoned").push(notice);
        Ok(())
    }
}

pub fn branches() -> Arc<Branches> {
    Arc::new(Branches::with_names(&["Giraffe Dizengoff", "Giraffe Haifa"]))
}

pub fn scores(pairs: &[(&str, i64)]) -> BTreeMap<String, ScoreInput> {
    pairs
        .iter()
        .map(|(key, score)| {
            (
                (*key).to_string(),
                ScoreInput {
                    score: Some(*score),
                    comments: None,
                },
            )
        })
        .collect()
}

/// Every category of the manager review table: operational 87.14,
/// people 80, business 86, leadership 75, overall 83.5.
pub fn full_scores() -> BTreeMap<String, ScoreInput> {
    scores(&[
        ("sanitation", 90),
        ("inventory", 80),
        ("quality", 100),
        ("maintenance", 70),
        ("recruitment", 80),
        ("scheduling", 85),
        ("retention", 75),
        ("sales", 90),
        ("efficiency", 80),
        ("leadership", 75),
    ])
}
