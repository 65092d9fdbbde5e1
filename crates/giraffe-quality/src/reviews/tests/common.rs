use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::audits::{AuditCategory, AuditId, AuditRepository, AuditStatus, SanitationAudit};
use crate::branches::BranchId;
use crate::reviews::{CreateReviewRequest, ManagerReviewService, Quarter};
use crate::scoring::{DefectLevel, PartialGroupPolicy, ScoreInput, WeightTable};
use crate::testing::{MemoryAudits, MemoryBranches, MemoryReviews};

pub(super) type TestService = ManagerReviewService<MemoryReviews, MemoryAudits, MemoryBranches>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn weights() -> Arc<WeightTable> {
    Arc::new(WeightTable::manager_review().expect("weight table is consistent"))
}

pub(super) fn build_service(policy: PartialGroupPolicy) -> (TestService, Arc<MemoryAudits>) {
    let branches = Arc::new(MemoryBranches::with_names(&["Giraffe Dizengoff", "Giraffe Haifa"]));
    let audits = Arc::new(MemoryAudits::default());
    let service = ManagerReviewService::new(
        Arc::new(MemoryReviews::default()),
        audits.clone(),
        branches,
        weights(),
        policy,
    );
    (service, audits)
}

pub(super) fn score(value: i64) -> ScoreInput {
    ScoreInput {
        score: Some(value),
        comments: None,
    }
}

pub(super) fn scores(pairs: &[(&str, i64)]) -> BTreeMap<String, ScoreInput> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), score(*value)))
        .collect()
}

/// All ten categories scored: operational 87.14, people 80, business 80,
/// leadership 90, overall 83.5.
pub(super) fn full_scores() -> BTreeMap<String, ScoreInput> {
    scores(&[
        ("sanitation", 90),
        ("inventory", 80),
        ("quality", 100),
        ("maintenance", 70),
        ("recruitment", 80),
        ("scheduling", 80),
        ("retention", 80),
        ("sales", 80),
        ("efficiency", 80),
        ("leadership", 90),
    ])
}

pub(super) fn create_request(
    manager_name: &str,
    scores: BTreeMap<String, ScoreInput>,
) -> CreateReviewRequest {
    CreateReviewRequest {
        manager_name: manager_name.to_string(),
        branch_id: BranchId(1),
        reviewer_name: Some("Tal".to_string()),
        year: 2025,
        quarter: Quarter::Q3,
        review_date: Some(date(2025, 9, 15)),
        scores,
    }
}

pub(super) fn seed_audit(
    audits: &MemoryAudits,
    id: u64,
    audit_date: NaiveDate,
    status: AuditStatus,
    levels: &[DefectLevel],
) {
    let now = Utc::now();
    let categories = levels
        .iter()
        .enumerate()
        .map(|(index, level)| AuditCategory {
            category_key: format!("station_{index}"),
            category_name: format!("Station {index}"),
            defect_level: *level,
            notes: None,
            check_performed: None,
            check_name: None,
            image_urls: Vec::new(),
            updated_at: now,
        })
        .collect();

    audits
        .insert(SanitationAudit {
            id: AuditId(id),
            branch_id: BranchId(1),
            auditor_name: "Nofar".to_string(),
            accompanist_name: None,
            audit_date,
            start_time: now,
            end_time: None,
            status,
            general_notes: None,
            equipment_issues: None,
            categories,
            signature_url: None,
            signed_at: None,
            created_at: now,
            updated_at: now,
        })
        .expect("audit stored");
}
