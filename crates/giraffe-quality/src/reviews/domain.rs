use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::branches::BranchId;
use crate::scoring::{
    aggregate, LinearLifecycle, PartialGroupPolicy, ScoreBreakdown, ScoreInput, Scorecard,
    WeightTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub u64);

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const fn ordered() -> [Self; 4] {
        [Self::Q1, Self::Q2, Self::Q3, Self::Q4]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }

    const fn first_month(self) -> u32 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 4,
            Self::Q3 => 7,
            Self::Q4 => 10,
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        match date.month() {
            1..=3 => Self::Q1,
            4..=6 => Self::Q2,
            7..=9 => Self::Q3,
            _ => Self::Q4,
        }
    }

    /// First and last calendar day of the quarter, or `None` for a year
    /// chrono cannot represent.
    pub fn date_range(self, year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(year, self.first_month(), 1)?;
        let end = match self {
            Self::Q4 => NaiveDate::from_ymd_opt(year, 12, 31)?,
            _ => NaiveDate::from_ymd_opt(year, self.first_month() + 3, 1)?.pred_opt()?,
        };
        Some((start, end))
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Draft,
    Submitted,
    Completed,
}

impl LinearLifecycle for ReviewStatus {
    const INITIAL: Self = ReviewStatus::Draft;

    fn next(self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Submitted),
            Self::Submitted => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
        }
    }
}

/// One item of the individual development plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevelopmentGoal {
    pub goal: String,
    #[serde(default)]
    pub actions: Vec<String>,
    pub timeline: String,
    pub support: String,
}

/// Figures pulled from completed sanitation audits of the branch in the
/// review quarter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoData {
    pub sanitation_avg: Option<f64>,
    pub sanitation_count: usize,
}

/// Quarterly performance review of a branch manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerReview {
    pub id: ReviewId,
    pub manager_name: String,
    pub branch_id: BranchId,
    pub reviewer_name: String,
    pub year: i32,
    pub quarter: Quarter,
    pub review_date: NaiveDate,
    pub status: ReviewStatus,
    pub scorecard: Scorecard,
    pub development_goals: Vec<DevelopmentGoal>,
    pub next_review_targets: Option<serde_json::Value>,
    pub auto_data: AutoData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ManagerReview {
    pub fn breakdown(&self, table: &WeightTable, policy: PartialGroupPolicy) -> ScoreBreakdown {
        aggregate(table, &self.scorecard, policy)
    }

    pub fn overall_score(&self, table: &WeightTable, policy: PartialGroupPolicy) -> Option<f64> {
        self.breakdown(table, policy).overall_score
    }

    pub fn period_label(&self) -> String {
        format!("{} {}", self.quarter, self.year)
    }

    pub fn summary_view(
        &self,
        branch_name: Option<&str>,
        table: &WeightTable,
        policy: PartialGroupPolicy,
    ) -> ReviewSummaryView {
        let breakdown = self.breakdown(table, policy);
        self.summary_from(branch_name, &breakdown)
    }

    pub fn detail_view(
        &self,
        branch_name: Option<&str>,
        table: &WeightTable,
        policy: PartialGroupPolicy,
    ) -> ReviewDetailView {
        let breakdown = self.breakdown(table, policy);
        ReviewDetailView {
            summary: self.summary_from(branch_name, &breakdown),
            breakdown,
            development_goals: self.development_goals.clone(),
            next_review_targets: self.next_review_targets.clone(),
        }
    }

    fn summary_from(
        &self,
        branch_name: Option<&str>,
        breakdown: &ScoreBreakdown,
    ) -> ReviewSummaryView {
        ReviewSummaryView {
            id: self.id,
            manager_name: self.manager_name.clone(),
            branch_id: self.branch_id,
            branch_name: branch_name.unwrap_or("Unknown").to_string(),
            reviewer_name: self.reviewer_name.clone(),
            year: self.year,
            quarter: self.quarter,
            period: self.period_label(),
            review_date: self.review_date,
            status: self.status,
            group_scores: breakdown
                .groups
                .iter()
                .map(|group| (group.key, group.score))
                .collect(),
            overall_score: breakdown.overall_score,
            auto_data: self.auto_data.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            submitted_at: self.submitted_at,
            completed_at: self.completed_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub manager_name: String,
    pub branch_id: BranchId,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    pub year: i32,
    pub quarter: Quarter,
    #[serde(default)]
    pub review_date: Option<NaiveDate>,
    #[serde(default)]
    pub scores: BTreeMap<String, ScoreInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReviewRequest {
    #[serde(default)]
    pub scores: BTreeMap<String, ScoreInput>,
    #[serde(default)]
    pub development_goals: Option<Vec<DevelopmentGoal>>,
    #[serde(default)]
    pub next_review_targets: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReviewFilter {
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub quarter: Option<Quarter>,
    #[serde(default)]
    pub status: Option<ReviewStatus>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &ManagerReview) -> bool {
        self.branch_id.map_or(true, |id| review.branch_id == id)
            && self.year.map_or(true, |year| review.year == year)
            && self.quarter.map_or(true, |quarter| review.quarter == quarter)
            && self.status.map_or(true, |status| review.status == status)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummaryView {
    pub id: ReviewId,
    pub manager_name: String,
    pub branch_id: BranchId,
    pub branch_name: String,
    pub reviewer_name: String,
    pub year: i32,
    pub quarter: Quarter,
    pub period: String,
    pub review_date: NaiveDate,
    pub status: ReviewStatus,
    pub group_scores: BTreeMap<&'static str, Option<f64>>,
    pub overall_score: Option<f64>,
    pub auto_data: AutoData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewDetailView {
    #[serde(flatten)]
    pub summary: ReviewSummaryView,
    pub breakdown: ScoreBreakdown,
    pub development_goals: Vec<DevelopmentGoal>,
    pub next_review_targets: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewHistoryEntry {
    pub id: ReviewId,
    pub period: String,
    pub year: i32,
    pub quarter: Quarter,
    pub overall_score: f64,
    pub group_scores: BTreeMap<&'static str, Option<f64>>,
    pub auto_sanitation_avg: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerHistory {
    pub manager_name: String,
    pub history: Vec<ReviewHistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingReviewNotice {
    pub id: ReviewId,
    pub manager_name: String,
    pub branch_name: String,
    pub status: ReviewStatus,
    pub year: i32,
    pub quarter: Quarter,
    pub days_since_created: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingReviewNotice {
    pub branch_id: BranchId,
    pub branch_name: String,
    pub year: i32,
    pub quarter: Quarter,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewNotifications {
    pub pending_reviews: Vec<PendingReviewNotice>,
    pub missing_reviews: Vec<MissingReviewNotice>,
    pub total_count: usize,
}
