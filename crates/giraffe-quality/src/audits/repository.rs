use super::domain::{AuditId, SanitationAudit};
use crate::repository::RepositoryError;

/// Storage abstraction for sanitation audits.
pub trait AuditRepository: Send + Sync {
    fn insert(&self, audit: SanitationAudit) -> Result<SanitationAudit, RepositoryError>;
    fn update(&self, audit: SanitationAudit) -> Result<(), RepositoryError>;
    fn fetch(&self, id: AuditId) -> Result<Option<SanitationAudit>, RepositoryError>;
    fn delete(&self, id: AuditId) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<SanitationAudit>, RepositoryError>;
}
