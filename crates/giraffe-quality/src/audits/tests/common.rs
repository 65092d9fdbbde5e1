use std::sync::Arc;

use chrono::NaiveDate;

use crate::audits::{AuditCategoryInput, CreateAuditRequest, SanitationAuditService};
use crate::branches::BranchId;
use crate::testing::{MemoryAudits, MemoryBranches, MemoryNotifier};

pub(super) type TestService =
    SanitationAuditService<MemoryAudits, MemoryBranches, MemoryNotifier>;

pub(super) fn build_service() -> (TestService, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::default());
    let service = SanitationAuditService::new(
        Arc::new(MemoryAudits::default()),
        Arc::new(MemoryBranches::with_names(&["Giraffe Dizengoff", "Giraffe Haifa"])),
        notifier.clone(),
    );
    (service, notifier)
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn category(
    key: &str,
    name: &str,
    level: &str,
    notes: Option<&str>,
) -> AuditCategoryInput {
    AuditCategoryInput {
        category_key: key.to_string(),
        category_name: name.to_string(),
        defect_level: level.to_string(),
        notes: notes.map(str::to_string),
        check_performed: None,
        check_name: None,
        image_urls: Vec::new(),
    }
}

pub(super) fn audit_request(
    branch: u64,
    audit_date: NaiveDate,
    categories: Vec<AuditCategoryInput>,
) -> CreateAuditRequest {
    CreateAuditRequest {
        branch_id: BranchId(branch),
        auditor_name: "Nofar Cohen".to_string(),
        accompanist_name: Some("Shift lead".to_string()),
        audit_date,
        start_time: None,
        general_notes: None,
        equipment_issues: None,
        categories,
    }
}

/// Meat station moderate with notes, cold room minor without notes: score 94.
pub(super) fn standard_categories() -> Vec<AuditCategoryInput> {
    vec![
        category("meat_station", "Meat station", "moderate", Some("Raw meat above salads")),
        category("cold_room", "Cold room", "Minor Defect", None),
        category("dishwashing", "Dishwashing", "normal", None),
    ]
}
