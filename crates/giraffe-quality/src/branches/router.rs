use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::{BranchDirectory, BranchError, BranchId, BranchRepository, NewBranch};

pub fn branch_router<B>(directory: Arc<BranchDirectory<B>>) -> Router
where
    B: BranchRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/branches",
            get(list_handler::<B>).post(create_handler::<B>),
        )
        .route("/api/v1/branches/:branch_id", get(get_handler::<B>))
        .with_state(directory)
}

pub(crate) async fn list_handler<B>(State(directory): State<Arc<BranchDirectory<B>>>) -> Response
where
    B: BranchRepository + 'static,
{
    match directory.list() {
        Ok(branches) => (StatusCode::OK, Json(branches)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<B>(
    State(directory): State<Arc<BranchDirectory<B>>>,
    Json(request): Json<NewBranch>,
) -> Response
where
    B: BranchRepository + 'static,
{
    match directory.create(request) {
        Ok(branch) => (StatusCode::CREATED, Json(branch)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<B>(
    State(directory): State<Arc<BranchDirectory<B>>>,
    Path(branch_id): Path<u64>,
) -> Response
where
    B: BranchRepository + 'static,
{
    match directory.get(BranchId(branch_id)) {
        Ok(branch) => (StatusCode::OK, Json(branch)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: BranchError) -> Response {
    let status = match &err {
        BranchError::EmptyName => StatusCode::UNPROCESSABLE_ENTITY,
        BranchError::DuplicateName(_) => StatusCode::CONFLICT,
        BranchError::NotFound(_) => StatusCode::NOT_FOUND,
        BranchError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
