use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info};

use super::domain::{
    AutoData, CreateReviewRequest, ManagerHistory, ManagerReview, MissingReviewNotice,
    PendingReviewNotice, Quarter, ReviewDetailView, ReviewFilter, ReviewHistoryEntry, ReviewId,
    ReviewNotifications, ReviewStatus, ReviewSummaryView, UpdateReviewRequest,
};
use super::repository::ReviewRepository;
use crate::audits::AuditRepository;
use crate::branches::{BranchId, BranchRepository};
use crate::repository::RepositoryError;
use crate::scoring::{
    round_to, LifecycleError, LinearLifecycle, PartialGroupPolicy, Scorecard, ScoringError,
    WeightTable,
};

const DEFAULT_REVIEWER: &str = "HQ";

/// Manager review workflow: scoring, lifecycle and audit cross-reference.
pub struct ManagerReviewService<R, S, B> {
    reviews: Arc<R>,
    audits: Arc<S>,
    branches: Arc<B>,
    weights: Arc<WeightTable>,
    policy: PartialGroupPolicy,
    sequence: AtomicU64,
    writes: Mutex<()>,
}

impl<R, S, B> ManagerReviewService<R, S, B>
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    pub fn new(
        reviews: Arc<R>,
        audits: Arc<S>,
        branches: Arc<B>,
        weights: Arc<WeightTable>,
        policy: PartialGroupPolicy,
    ) -> Self {
        let next = reviews
            .all()
            .map(|stored| stored.iter().map(|review| review.id.0).max().unwrap_or(0))
            .unwrap_or(0);

        Self {
            reviews,
            audits,
            branches,
            weights,
            policy,
            sequence: AtomicU64::new(next + 1),
            writes: Mutex::new(()),
        }
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn policy(&self) -> PartialGroupPolicy {
        self.policy
    }

    pub fn create(
        &self,
        request: CreateReviewRequest,
    ) -> Result<ReviewDetailView, ReviewServiceError> {
        let manager_name = request.manager_name.trim().to_string();
        if manager_name.is_empty() {
            return Err(ReviewServiceError::EmptyManagerName);
        }

        let branch = self
            .branches
            .fetch(request.branch_id)?
            .ok_or(ReviewServiceError::BranchNotFound(request.branch_id))?;

        let _writes = self.write_guard()?;
        let duplicate = self.reviews.all()?.into_iter().any(|review| {
            review.branch_id == request.branch_id
                && review.year == request.year
                && review.quarter == request.quarter
                && review.manager_name.eq_ignore_ascii_case(&manager_name)
        });
        if duplicate {
            return Err(ReviewServiceError::Duplicate {
                manager_name,
                quarter: request.quarter,
                year: request.year,
            });
        }

        let mut scorecard = Scorecard::for_table(&self.weights);
        scorecard.apply_all(&request.scores)?;

        let auto_data = self.auto_data(request.branch_id, request.year, request.quarter)?;
        let now = Utc::now();
        let review = ManagerReview {
            id: ReviewId(self.sequence.fetch_add(1, Ordering::Relaxed)),
            manager_name,
            branch_id: request.branch_id,
            reviewer_name: request
                .reviewer_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_REVIEWER.to_string()),
            year: request.year,
            quarter: request.quarter,
            review_date: request.review_date.unwrap_or_else(|| now.date_naive()),
            status: ReviewStatus::INITIAL,
            scorecard,
            development_goals: Vec::new(),
            next_review_targets: None,
            auto_data,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            completed_at: None,
        };

        let stored = self.reviews.insert(review)?;
        info!(
            review_id = %stored.id,
            branch_id = %stored.branch_id,
            period = %stored.period_label(),
            "manager review created"
        );
        Ok(stored.detail_view(Some(&branch.name), &self.weights, self.policy))
    }

    /// Average of closed sanitation audits for the branch within the quarter.
    pub fn auto_data(
        &self,
        branch_id: BranchId,
        year: i32,
        quarter: Quarter,
    ) -> Result<AutoData, ReviewServiceError> {
        let (start, end) = quarter
            .date_range(year)
            .ok_or(ReviewServiceError::InvalidPeriod { year })?;

        let scores: Vec<u32> = self
            .audits
            .all()?
            .iter()
            .filter(|audit| {
                audit.branch_id == branch_id
                    && audit.status.is_closed()
                    && audit.audit_date >= start
                    && audit.audit_date <= end
            })
            .map(|audit| audit.total_score())
            .collect();

        if scores.is_empty() {
            return Ok(AutoData::default());
        }

        let total: u32 = scores.iter().sum();
        Ok(AutoData {
            sanitation_avg: Some(round_to(f64::from(total) / scores.len() as f64, 1)),
            sanitation_count: scores.len(),
        })
    }

    /// Reviews matching `filter`, newest period first.
    pub fn list(&self, filter: ReviewFilter) -> Result<Vec<ReviewSummaryView>, ReviewServiceError> {
        let names = self.branch_names()?;
        let mut reviews: Vec<ManagerReview> = self
            .reviews
            .all()?
            .into_iter()
            .filter(|review| filter.matches(review))
            .collect();
        reviews.sort_by(|a, b| {
            (b.year, b.quarter, b.created_at).cmp(&(a.year, a.quarter, a.created_at))
        });

        Ok(reviews
            .iter()
            .map(|review| {
                review.summary_view(
                    names.get(&review.branch_id).map(String::as_str),
                    &self.weights,
                    self.policy,
                )
            })
            .collect())
    }

    pub fn get(&self, id: ReviewId) -> Result<ReviewDetailView, ReviewServiceError> {
        let review = self.load(id)?;
        self.detail(&review)
    }

    pub fn update(
        &self,
        id: ReviewId,
        request: UpdateReviewRequest,
    ) -> Result<ReviewDetailView, ReviewServiceError> {
        let _writes = self.write_guard()?;
        let mut review = self.load(id)?;
        review.status.ensure_editable()?;

        review.scorecard.apply_all(&request.scores)?;
        if let Some(goals) = request.development_goals {
            review.development_goals = goals;
        }
        if let Some(targets) = request.next_review_targets {
            review.next_review_targets = Some(targets);
        }
        review.updated_at = Utc::now();

        self.reviews.update(review.clone())?;
        debug!(review_id = %id, scores = request.scores.len(), "manager review updated");
        self.detail(&review)
    }

    pub fn submit(&self, id: ReviewId) -> Result<ReviewDetailView, ReviewServiceError> {
        let _writes = self.write_guard()?;
        let mut review = self.load(id)?;
        review.status = review.status.advance_to(ReviewStatus::Submitted)?;

        let now = Utc::now();
        review.submitted_at = Some(now);
        review.updated_at = now;

        self.reviews.update(review.clone())?;
        info!(review_id = %id, "manager review submitted");
        self.detail(&review)
    }

    /// Completing freezes the review, so every category must carry a score.
    pub fn complete(&self, id: ReviewId) -> Result<ReviewDetailView, ReviewServiceError> {
        let _writes = self.write_guard()?;
        let mut review = self.load(id)?;
        let status = review.status.advance_to(ReviewStatus::Completed)?;
        review.scorecard.require_complete(&self.weights)?;

        let now = Utc::now();
        review.status = status;
        review.completed_at = Some(now);
        review.updated_at = now;

        self.reviews.update(review.clone())?;
        info!(
            review_id = %id,
            overall_score = ?review.overall_score(&self.weights, self.policy),
            "manager review completed"
        );
        self.detail(&review)
    }

    pub fn delete(&self, id: ReviewId) -> Result<(), ReviewServiceError> {
        let _writes = self.write_guard()?;
        let review = self.load(id)?;
        review.status.ensure_deletable()?;
        self.reviews.delete(id)?;
        info!(review_id = %id, "manager review deleted");
        Ok(())
    }

    /// Scored reviews of one manager in chronological order.
    pub fn history(&self, manager_name: &str) -> Result<ManagerHistory, ReviewServiceError> {
        let mut reviews: Vec<ManagerReview> = self
            .reviews
            .all()?
            .into_iter()
            .filter(|review| review.manager_name.eq_ignore_ascii_case(manager_name.trim()))
            .collect();
        reviews.sort_by_key(|review| (review.year, review.quarter));

        let history = reviews
            .iter()
            .filter_map(|review| {
                let breakdown = review.breakdown(&self.weights, self.policy);
                let overall_score = breakdown.overall_score?;
                Some(ReviewHistoryEntry {
                    id: review.id,
                    period: review.period_label(),
                    year: review.year,
                    quarter: review.quarter,
                    overall_score,
                    group_scores: breakdown
                        .groups
                        .iter()
                        .map(|group| (group.key, group.score))
                        .collect(),
                    auto_sanitation_avg: review.auto_data.sanitation_avg,
                })
            })
            .collect();

        Ok(ManagerHistory {
            manager_name: manager_name.trim().to_string(),
            history,
        })
    }

    /// Open reviews plus branches without a review for the quarter of `today`.
    pub fn notifications(
        &self,
        today: NaiveDate,
    ) -> Result<ReviewNotifications, ReviewServiceError> {
        let names = self.branch_names()?;
        let reviews = self.reviews.all()?;

        let mut pending_reviews: Vec<PendingReviewNotice> = reviews
            .iter()
            .filter(|review| !review.status.is_terminal())
            .map(|review| PendingReviewNotice {
                id: review.id,
                manager_name: review.manager_name.clone(),
                branch_name: names
                    .get(&review.branch_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                status: review.status,
                year: review.year,
                quarter: review.quarter,
                days_since_created: (today - review.created_at.date_naive()).num_days().max(0),
            })
            .collect();
        pending_reviews.sort_by(|a, b| b.days_since_created.cmp(&a.days_since_created));

        let year = today.year();
        let quarter = Quarter::containing(today);
        let reviewed: BTreeSet<BranchId> = reviews
            .iter()
            .filter(|review| review.year == year && review.quarter == quarter)
            .map(|review| review.branch_id)
            .collect();

        let missing_reviews: Vec<MissingReviewNotice> = names
            .iter()
            .filter(|(id, _)| !reviewed.contains(id))
            .map(|(id, name)| MissingReviewNotice {
                branch_id: *id,
                branch_name: name.clone(),
                year,
                quarter,
            })
            .collect();

        let total_count = pending_reviews.len() + missing_reviews.len();
        Ok(ReviewNotifications {
            pending_reviews,
            missing_reviews,
            total_count,
        })
    }

    /// Serialises read-modify-write cycles so a stale copy never
    /// overwrites a newer status.
    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, RepositoryError> {
        self.writes
            .lock()
            .map_err(|_| RepositoryError::Unavailable("review write lock poisoned".to_string()))
    }

    fn load(&self, id: ReviewId) -> Result<ManagerReview, ReviewServiceError> {
        self.reviews
            .fetch(id)?
            .ok_or(ReviewServiceError::NotFound(id))
    }

    fn detail(&self, review: &ManagerReview) -> Result<ReviewDetailView, ReviewServiceError> {
        let branch = self.branches.fetch(review.branch_id)?;
        Ok(review.detail_view(
            branch.as_ref().map(|branch| branch.name.as_str()),
            &self.weights,
            self.policy,
        ))
    }

    fn branch_names(&self) -> Result<BTreeMap<BranchId, String>, ReviewServiceError> {
        Ok(self
            .branches
            .all()?
            .into_iter()
            .map(|branch| (branch.id, branch.name))
            .collect())
    }
}

/// Error raised by the manager review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error("manager name must not be empty")]
    EmptyManagerName,
    #[error("review {0} not found")]
    NotFound(ReviewId),
    #[error("branch {0} not found")]
    BranchNotFound(BranchId),
    #[error("a review for {manager_name} already exists for {quarter} {year}")]
    Duplicate {
        manager_name: String,
        quarter: Quarter,
        year: i32,
    },
    #[error("year {year} is outside the supported calendar range")]
    InvalidPeriod { year: i32 },
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
