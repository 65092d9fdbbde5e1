use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use giraffe_quality::audits::{
    audit_router, summarize_deficiencies, AuditCategory, AuditCategoryInput, AuditCategoryView,
    AuditNotifier, AuditRepository, SanitationAuditService, ScoreBand,
};
use giraffe_quality::branches::{branch_router, BranchDirectory, BranchRepository};
use giraffe_quality::error::AppError;
use giraffe_quality::import::{AuditSheetImporter, ImportError, ScoresheetImporter};
use giraffe_quality::reviews::{review_router, ManagerReviewService, ReviewRepository};
use giraffe_quality::scoring::{
    aggregate, compute_audit_score, total_deductions, DefectLevel, DefectLevelView,
    PartialGroupPolicy, ScoreBreakdown, ScoreInput, Scorecard,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::sync::Arc;

/// Scores a manager review sheet without storing it. `csv` takes precedence
/// over `scores` when both are sent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewPreviewRequest {
    #[serde(default)]
    pub(crate) scores: BTreeMap<String, ScoreInput>,
    #[serde(default)]
    pub(crate) csv: Option<String>,
    #[serde(default)]
    pub(crate) policy: Option<PartialGroupPolicy>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AuditPreviewRequest {
    #[serde(default)]
    pub(crate) categories: Vec<AuditCategoryInput>,
    #[serde(default)]
    pub(crate) csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AuditPreviewResponse {
    pub(crate) total_deductions: u32,
    pub(crate) total_score: u32,
    pub(crate) band: ScoreBand,
    pub(crate) deficiencies_summary: String,
    pub(crate) categories: Vec<AuditCategoryView>,
}

pub(crate) fn with_quality_routes<B, R, S, N>(
    branches: Arc<BranchDirectory<B>>,
    reviews: Arc<ManagerReviewService<R, S, B>>,
    audits: Arc<SanitationAuditService<S, B, N>>,
) -> axum::Router
where
    B: BranchRepository + 'static,
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    N: AuditNotifier + 'static,
{
    branch_router(branches)
        .merge(review_router(reviews))
        .merge(audit_router(audits))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/scoring/weights/manager-review",
            axum::routing::get(weights_endpoint),
        )
        .route(
            "/api/v1/scoring/defect-levels",
            axum::routing::get(defect_levels_endpoint),
        )
        .route(
            "/api/v1/scoring/manager-review",
            axum::routing::post(review_preview_endpoint),
        )
        .route(
            "/api/v1/scoring/sanitation-audit",
            axum::routing::post(audit_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn weights_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    Json(json!({
        "version": state.weights.version(),
        "policy": state.policy,
        "groups": state.weights.groups(),
    }))
}

pub(crate) async fn defect_levels_endpoint() -> Json<Vec<DefectLevelView>> {
    Json(DefectLevel::ordered().into_iter().map(DefectLevel::view).collect())
}

pub(crate) async fn review_preview_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ReviewPreviewRequest>,
) -> Result<Json<ScoreBreakdown>, AppError> {
    let ReviewPreviewRequest {
        scores,
        csv,
        policy,
    } = payload;

    let scorecard = if let Some(csv) = csv {
        ScoresheetImporter::from_reader(Cursor::new(csv.into_bytes()), &state.weights)?
    } else {
        let mut scorecard = Scorecard::for_table(&state.weights);
        scorecard.apply_all(&scores)?;
        scorecard
    };

    let policy = policy.unwrap_or(state.policy);
    Ok(Json(aggregate(&state.weights, &scorecard, policy)))
}

pub(crate) async fn audit_preview_endpoint(
    Json(payload): Json<AuditPreviewRequest>,
) -> Result<Json<AuditPreviewResponse>, AppError> {
    let AuditPreviewRequest { categories, csv } = payload;

    let categories = if let Some(csv) = csv {
        AuditSheetImporter::from_reader(Cursor::new(csv.into_bytes()))?
    } else {
        let now = Utc::now();
        let mut seen = HashSet::new();
        let mut parsed = Vec::with_capacity(categories.len());
        for input in categories {
            let category = input.into_category(now)?;
            if !seen.insert(category.category_key.clone()) {
                return Err(ImportError::DuplicateCategory(category.category_key).into());
            }
            parsed.push(category);
        }
        parsed
    };

    Ok(Json(audit_preview(&categories)))
}

fn audit_preview(categories: &[AuditCategory]) -> AuditPreviewResponse {
    let deductions = || categories.iter().map(AuditCategory::deduction);
    let total_score = compute_audit_score(deductions());

    AuditPreviewResponse {
        total_deductions: total_deductions(deductions()),
        total_score,
        band: ScoreBand::from_score(total_score),
        deficiencies_summary: summarize_deficiencies(categories),
        categories: categories.iter().map(AuditCategory::to_view).collect(),
    }
}
