use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::branches::BranchId;
use crate::scoring::{
    compute_audit_score, total_deductions, DefectLevel, LinearLifecycle, ScoringError,
};

pub const NO_DEFICIENCIES: &str = "No deficiencies found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditId(pub u64);

impl fmt::Display for AuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    InProgress,
    Completed,
    Reviewed,
}

impl AuditStatus {
    /// Completed or reviewed audits count toward branch averages.
    pub fn is_closed(self) -> bool {
        !self.is_initial()
    }
}

impl LinearLifecycle for AuditStatus {
    const INITIAL: Self = AuditStatus::InProgress;

    fn next(self) -> Option<Self> {
        match self {
            Self::InProgress => Some(Self::Completed),
            Self::Completed => Some(Self::Reviewed),
            Self::Reviewed => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Reviewed => "reviewed",
        }
    }
}

/// One inspected station or area within an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCategory {
    pub category_key: String,
    pub category_name: String,
    pub defect_level: DefectLevel,
    pub notes: Option<String>,
    pub check_performed: Option<bool>,
    pub check_name: Option<String>,
    pub image_urls: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl AuditCategory {
    pub fn deduction(&self) -> u32 {
        self.defect_level.points()
    }

    pub fn to_view(&self) -> AuditCategoryView {
        AuditCategoryView {
            category_key: self.category_key.clone(),
            category_name: self.category_name.clone(),
            defect_level: self.defect_level,
            defect_label: self.defect_level.label(),
            deduction: self.deduction(),
            notes: self.notes.clone(),
            check_performed: self.check_performed,
            check_name: self.check_name.clone(),
            image_urls: self.image_urls.clone(),
            updated_at: self.updated_at,
        }
    }
}

fn default_defect_level() -> String {
    DefectLevel::Normal.key().to_string()
}

/// Category as submitted by the auditor. The defect level stays a raw string
/// until parsed so that unknown levels are reported as scoring errors.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditCategoryInput {
    pub category_key: String,
    pub category_name: String,
    #[serde(default = "default_defect_level")]
    pub defect_level: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub check_performed: Option<bool>,
    #[serde(default)]
    pub check_name: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl AuditCategoryInput {
    pub fn into_category(self, now: DateTime<Utc>) -> Result<AuditCategory, ScoringError> {
        let category_key = self.category_key.trim().to_string();
        if category_key.is_empty() {
            return Err(ScoringError::EmptyCategoryKey);
        }
        let defect_level = self.defect_level.parse::<DefectLevel>()?;
        Ok(AuditCategory {
            category_key,
            category_name: self.category_name.trim().to_string(),
            defect_level,
            notes: non_blank(self.notes),
            check_performed: self.check_performed,
            check_name: non_blank(self.check_name),
            image_urls: self.image_urls,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditCategoryUpdate {
    #[serde(default)]
    pub defect_level: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub check_performed: Option<bool>,
    #[serde(default)]
    pub check_name: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
}

impl AuditCategoryUpdate {
    /// Applies the update after validating the defect level, leaving the
    /// category untouched on error.
    pub fn apply(
        self,
        category: &mut AuditCategory,
        now: DateTime<Utc>,
    ) -> Result<(), ScoringError> {
        let level = self
            .defect_level
            .as_deref()
            .map(str::parse::<DefectLevel>)
            .transpose()?;

        if let Some(level) = level {
            category.defect_level = level;
        }
        if let Some(notes) = self.notes {
            category.notes = non_blank(Some(notes));
        }
        if let Some(check_performed) = self.check_performed {
            category.check_performed = Some(check_performed);
        }
        if let Some(check_name) = self.check_name {
            category.check_name = non_blank(Some(check_name));
        }
        if let Some(image_urls) = self.image_urls {
            category.image_urls = image_urls;
        }
        category.updated_at = now;
        Ok(())
    }
}

/// One HQ visit to a branch. Scores are derived from the categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitationAudit {
    pub id: AuditId,
    pub branch_id: BranchId,
    pub auditor_name: String,
    pub accompanist_name: Option<String>,
    pub audit_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: AuditStatus,
    pub general_notes: Option<String>,
    pub equipment_issues: Option<String>,
    pub categories: Vec<AuditCategory>,
    pub signature_url: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SanitationAudit {
    pub fn total_deductions(&self) -> u32 {
        total_deductions(self.categories.iter().map(AuditCategory::deduction))
    }

    pub fn total_score(&self) -> u32 {
        compute_audit_score(self.categories.iter().map(AuditCategory::deduction))
    }

    pub fn category_mut(&mut self, key: &str) -> Option<&mut AuditCategory> {
        self.categories
            .iter_mut()
            .find(|category| category.category_key == key)
    }

    /// Categories that cost points, in inspection order.
    pub fn deficiencies(&self) -> impl Iterator<Item = &AuditCategory> {
        self.categories
            .iter()
            .filter(|category| category.deduction() > 0)
    }

    pub fn deficiencies_summary(&self) -> String {
        summarize_deficiencies(&self.categories)
    }

    pub fn summary_view(&self, branch_name: Option<&str>) -> AuditSummaryView {
        AuditSummaryView {
            id: self.id,
            branch_id: self.branch_id,
            branch_name: branch_name.unwrap_or("Unknown").to_string(),
            audit_date: self.audit_date,
            auditor_name: self.auditor_name.clone(),
            total_score: self.total_score(),
            total_deductions: self.total_deductions(),
            status: self.status,
            created_at: self.created_at,
        }
    }

    pub fn detail_view(&self, branch_name: Option<&str>) -> AuditDetailView {
        AuditDetailView {
            summary: self.summary_view(branch_name),
            accompanist_name: self.accompanist_name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            general_notes: self.general_notes.clone(),
            equipment_issues: self.equipment_issues.clone(),
            deficiencies_summary: self.deficiencies_summary(),
            signature_url: self.signature_url.clone(),
            signed_at: self.signed_at,
            updated_at: self.updated_at,
            categories: self.categories.iter().map(AuditCategory::to_view).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuditRequest {
    pub branch_id: BranchId,
    pub auditor_name: String,
    #[serde(default)]
    pub accompanist_name: Option<String>,
    pub audit_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub general_notes: Option<String>,
    #[serde(default)]
    pub equipment_issues: Option<String>,
    #[serde(default)]
    pub categories: Vec<AuditCategoryInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAuditRequest {
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accompanist_name: Option<String>,
    #[serde(default)]
    pub general_notes: Option<String>,
    #[serde(default)]
    pub equipment_issues: Option<String>,
    #[serde(default)]
    pub status: Option<AuditStatus>,
    #[serde(default)]
    pub signature_url: Option<String>,
}

impl UpdateAuditRequest {
    pub fn touches_details(&self) -> bool {
        self.end_time.is_some()
            || self.accompanist_name.is_some()
            || self.general_notes.is_some()
            || self.equipment_issues.is_some()
            || self.signature_url.is_some()
    }
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AuditListQuery {
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for AuditListQuery {
    fn default() -> Self {
        Self {
            branch_id: None,
            skip: 0,
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditCategoryView {
    pub category_key: String,
    pub category_name: String,
    pub defect_level: DefectLevel,
    pub defect_label: &'static str,
    pub deduction: u32,
    pub notes: Option<String>,
    pub check_performed: Option<bool>,
    pub check_name: Option<String>,
    pub image_urls: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummaryView {
    pub id: AuditId,
    pub branch_id: BranchId,
    pub branch_name: String,
    pub audit_date: NaiveDate,
    pub auditor_name: String,
    pub total_score: u32,
    pub total_deductions: u32,
    pub status: AuditStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditDetailView {
    #[serde(flatten)]
    pub summary: AuditSummaryView,
    pub accompanist_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub general_notes: Option<String>,
    pub equipment_issues: Option<String>,
    pub deficiencies_summary: String,
    pub signature_url: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<AuditCategoryView>,
}

/// One `name - notes` line per deducted category that carries notes.
pub fn summarize_deficiencies(categories: &[AuditCategory]) -> String {
    let lines: Vec<String> = categories
        .iter()
        .filter(|category| category.deduction() > 0)
        .filter_map(|category| {
            category
                .notes
                .as_ref()
                .map(|notes| format!("{} - {}", category.category_name, notes))
        })
        .collect();

    if lines.is_empty() {
        NO_DEFICIENCIES.to_string()
    } else {
        lines.join("\n")
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
