//! Restaurant branches referenced by reviews and audits.

pub mod router;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::repository::RepositoryError;

pub use router::branch_router;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(pub u64);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBranch {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// Storage abstraction for branches.
pub trait BranchRepository: Send + Sync {
    fn insert(&self, branch: Branch) -> Result<Branch, RepositoryError>;
    fn fetch(&self, id: BranchId) -> Result<Option<Branch>, RepositoryError>;
    fn all(&self) -> Result<Vec<Branch>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BranchError {
    #[error("branch name must not be empty")]
    EmptyName,
    #[error("branch '{0}' already exists")]
    DuplicateName(String),
    #[error("branch {0} not found")]
    NotFound(BranchId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct BranchDirectory<B> {
    repository: Arc<B>,
    sequence: AtomicU64,
}

impl<B> BranchDirectory<B>
where
    B: BranchRepository + 'static,
{
    pub fn new(repository: Arc<B>) -> Self {
        let next = repository
            .all()
            .map(|branches| branches.iter().map(|branch| branch.id.0).max().unwrap_or(0))
            .unwrap_or(0);

        Self {
            repository,
            sequence: AtomicU64::new(next + 1),
        }
    }

    pub fn create(&self, request: NewBranch) -> Result<Branch, BranchError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(BranchError::EmptyName);
        }

        let taken = self
            .repository
            .all()?
            .iter()
            .any(|branch| branch.name.eq_ignore_ascii_case(&name));
        if taken {
            return Err(BranchError::DuplicateName(name));
        }

        let branch = Branch {
            id: BranchId(self.sequence.fetch_add(1, Ordering::Relaxed)),
            name,
            location: request
                .location
                .map(|location| location.trim().to_string())
                .filter(|location| !location.is_empty()),
            created_at: Utc::now(),
        };

        let stored = self.repository.insert(branch)?;
        info!(branch_id = %stored.id, name = %stored.name, "branch created");
        Ok(stored)
    }

    pub fn get(&self, id: BranchId) -> Result<Branch, BranchError> {
        self.repository.fetch(id)?.ok_or(BranchError::NotFound(id))
    }

    /// All branches ordered by name.
    pub fn list(&self) -> Result<Vec<Branch>, BranchError> {
        let mut branches = self.repository.all()?;
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    pub fn repository(&self) -> Arc<B> {
        Arc::clone(&self.repository)
    }
}
