use super::domain::{ManagerReview, ReviewId};
use crate::repository::RepositoryError;

/// Storage abstraction so the review service can be exercised in isolation.
pub trait ReviewRepository: Send + Sync {
    fn insert(&self, review: ManagerReview) -> Result<ManagerReview, RepositoryError>;
    fn update(&self, review: ManagerReview) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ReviewId) -> Result<Option<ManagerReview>, RepositoryError>;
    fn delete(&self, id: ReviewId) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<ManagerReview>, RepositoryError>;
}
