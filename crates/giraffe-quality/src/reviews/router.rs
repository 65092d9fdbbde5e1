use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CreateReviewRequest, ReviewFilter, ReviewId, UpdateReviewRequest};
use super::repository::ReviewRepository;
use super::service::{ManagerReviewService, ReviewServiceError};
use crate::audits::AuditRepository;
use crate::branches::BranchRepository;
use crate::repository::RepositoryError;
use crate::scoring::LifecycleError;

type SharedService<R, S, B> = Arc<ManagerReviewService<R, S, B>>;

/// Router exposing the manager review workflow.
pub fn review_router<R, S, B>(service: SharedService<R, S, B>) -> Router
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/manager-reviews",
            get(list_handler::<R, S, B>).post(create_handler::<R, S, B>),
        )
        .route(
            "/api/v1/manager-reviews/notifications",
            get(notifications_handler::<R, S, B>),
        )
        .route(
            "/api/v1/manager-reviews/managers/:manager_name/history",
            get(history_handler::<R, S, B>),
        )
        .route(
            "/api/v1/manager-reviews/:review_id",
            get(get_handler::<R, S, B>)
                .put(update_handler::<R, S, B>)
                .delete(delete_handler::<R, S, B>),
        )
        .route(
            "/api/v1/manager-reviews/:review_id/submit",
            post(submit_handler::<R, S, B>),
        )
        .route(
            "/api/v1/manager-reviews/:review_id/complete",
            post(complete_handler::<R, S, B>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<R, S, B>(
    State(service): State<SharedService<R, S, B>>,
    Query(filter): Query<ReviewFilter>,
) -> Response
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    match service.list(filter) {
        Ok(reviews) => (StatusCode::OK, Json(reviews)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<R, S, B>(
    State(service): State<SharedService<R, S, B>>,
    Json(request): Json<CreateReviewRequest>,
) -> Response
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    match service.create(request) {
        Ok(review) => (StatusCode::CREATED, Json(review)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<R, S, B>(
    State(service): State<SharedService<R, S, B>>,
    Path(review_id): Path<u64>,
) -> Response
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    match service.get(ReviewId(review_id)) {
        Ok(review) => (StatusCode::OK, Json(review)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<R, S, B>(
    State(service): State<SharedService<R, S, B>>,
    Path(review_id): Path<u64>,
    Json(request): Json<UpdateReviewRequest>,
) -> Response
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    match service.update(ReviewId(review_id), request) {
        Ok(review) => (StatusCode::OK, Json(review)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<R, S, B>(
    State(service): State<SharedService<R, S, B>>,
    Path(review_id): Path<u64>,
) -> Response
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    match service.delete(ReviewId(review_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<R, S, B>(
    State(service): State<SharedService<R, S, B>>,
    Path(review_id): Path<u64>,
) -> Response
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    match service.submit(ReviewId(review_id)) {
        Ok(review) => (StatusCode::OK, Json(review)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn complete_handler<R, S, B>(
    State(service): State<SharedService<R, S, B>>,
    Path(review_id): Path<u64>,
) -> Response
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    match service.complete(ReviewId(review_id)) {
        Ok(review) => (StatusCode::OK, Json(review)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<R, S, B>(
    State(service): State<SharedService<R, S, B>>,
    Path(manager_name): Path<String>,
) -> Response
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    match service.history(&manager_name) {
        Ok(history) => (StatusCode::OK, Json(history)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NotificationQuery {
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn notifications_handler<R, S, B>(
    State(service): State<SharedService<R, S, B>>,
    Query(query): Query<NotificationQuery>,
) -> Response
where
    R: ReviewRepository + 'static,
    S: AuditRepository + 'static,
    B: BranchRepository + 'static,
{
    let today = query.today.unwrap_or_else(|| Utc::now().date_naive());
    match service.notifications(today) {
        Ok(notifications) => (StatusCode::OK, Json(notifications)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ReviewServiceError) -> Response {
    let status = match &err {
        ReviewServiceError::EmptyManagerName
        | ReviewServiceError::InvalidPeriod { .. }
        | ReviewServiceError::Scoring(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReviewServiceError::NotFound(_)
        | ReviewServiceError::BranchNotFound(_)
        | ReviewServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReviewServiceError::Duplicate { .. }
        | ReviewServiceError::Lifecycle(LifecycleError::Frozen { .. })
        | ReviewServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ReviewServiceError::Lifecycle(_) => StatusCode::BAD_REQUEST,
        ReviewServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
