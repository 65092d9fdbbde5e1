use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde_json::json;

use super::domain::{
    AuditCategoryUpdate, AuditId, AuditListQuery, CreateAuditRequest, UpdateAuditRequest,
};
use super::notify::AuditNotifier;
use super::repository::AuditRepository;
use super::service::{AuditServiceError, SanitationAuditService};
use crate::branches::{BranchId, BranchRepository};
use crate::repository::RepositoryError;
use crate::scoring::LifecycleError;

type SharedService<S, B, N> = Arc<SanitationAuditService<S, B, N>>;

/// Router exposing sanitation audits and their statistics.
pub fn audit_router<S, B, N>(service: SharedService<S, B, N>) -> Router
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/sanitation-audits",
            get(list_handler::<S, B, N>).post(create_handler::<S, B, N>),
        )
        .route(
            "/api/v1/sanitation-audits/stats/network",
            get(network_stats_handler::<S, B, N>),
        )
        .route(
            "/api/v1/sanitation-audits/stats/branch/:branch_id",
            get(branch_stats_handler::<S, B, N>),
        )
        .route(
            "/api/v1/sanitation-audits/:audit_id",
            get(get_handler::<S, B, N>)
                .put(update_handler::<S, B, N>)
                .delete(delete_handler::<S, B, N>),
        )
        .route(
            "/api/v1/sanitation-audits/:audit_id/categories/:category_key",
            put(update_category_handler::<S, B, N>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<S, B, N>(
    State(service): State<SharedService<S, B, N>>,
    Query(query): Query<AuditListQuery>,
) -> Response
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    match service.list(query) {
        Ok(audits) => (StatusCode::OK, Json(audits)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<S, B, N>(
    State(service): State<SharedService<S, B, N>>,
    Json(request): Json<CreateAuditRequest>,
) -> Response
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    match service.create(request) {
        Ok(audit) => (StatusCode::CREATED, Json(audit)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<S, B, N>(
    State(service): State<SharedService<S, B, N>>,
    Path(audit_id): Path<u64>,
) -> Response
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    match service.get(AuditId(audit_id)) {
        Ok(audit) => (StatusCode::OK, Json(audit)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<S, B, N>(
    State(service): State<SharedService<S, B, N>>,
    Path(audit_id): Path<u64>,
    Json(request): Json<UpdateAuditRequest>,
) -> Response
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    match service.update(AuditId(audit_id), request) {
        Ok(audit) => (StatusCode::OK, Json(audit)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<S, B, N>(
    State(service): State<SharedService<S, B, N>>,
    Path(audit_id): Path<u64>,
) -> Response
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    match service.delete(AuditId(audit_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_category_handler<S, B, N>(
    State(service): State<SharedService<S, B, N>>,
    Path((audit_id, category_key)): Path<(u64, String)>,
    Json(update): Json<AuditCategoryUpdate>,
) -> Response
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    match service.update_category(AuditId(audit_id), &category_key, update) {
        Ok(category) => (StatusCode::OK, Json(category)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn branch_stats_handler<S, B, N>(
    State(service): State<SharedService<S, B, N>>,
    Path(branch_id): Path<u64>,
) -> Response
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    match service.branch_stats(BranchId(branch_id)) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn network_stats_handler<S, B, N>(
    State(service): State<SharedService<S, B, N>>,
) -> Response
where
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
    N: AuditNotifier + 'static,
{
    match service.network_stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AuditServiceError) -> Response {
    let status = match &err {
        AuditServiceError::EmptyAuditor
        | AuditServiceError::DuplicateCategory(_)
        | AuditServiceError::Scoring(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuditServiceError::NotFound(_)
        | AuditServiceError::BranchNotFound(_)
        | AuditServiceError::CategoryNotFound { .. }
        | AuditServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AuditServiceError::Lifecycle(LifecycleError::Frozen { .. })
        | AuditServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AuditServiceError::Lifecycle(_) => StatusCode::BAD_REQUEST,
        AuditServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
