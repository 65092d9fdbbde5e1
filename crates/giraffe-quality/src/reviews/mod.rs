//! Quarterly manager performance reviews.
//!
//! A review owns a [`Scorecard`](crate::scoring::Scorecard) over the manager
//! review weight table and moves `draft -> submitted -> completed`. Group and
//! overall scores are derived on every read, never stored.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AutoData, CreateReviewRequest, DevelopmentGoal, ManagerHistory, ManagerReview,
    MissingReviewNotice, PendingReviewNotice, Quarter, ReviewDetailView, ReviewFilter,
    ReviewHistoryEntry, ReviewId, ReviewNotifications, ReviewStatus, ReviewSummaryView,
    UpdateReviewRequest,
};
pub use repository::ReviewRepository;
pub use router::review_router;
pub use service::{ManagerReviewService, ReviewServiceError};
