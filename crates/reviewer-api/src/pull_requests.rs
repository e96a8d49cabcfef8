use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use reviewer_types::PullRequestDraft;
use reviewer_types::api::{
    MergePullRequestRequest, PullRequestQuery, PullRequestResponse, ReassignReviewerRequest,
    ReassignReviewerResponse,
};

use crate::AppState;
use crate::error::{ApiError, json_body, required_param};

pub async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<PullRequestDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = json_body(payload)?;
    let pr = state.service.create_pull_request(draft).await?;
    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

pub async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let pr = state.service.merge_pull_request(&req.pull_request_id).await?;
    Ok(Json(PullRequestResponse { pr }))
}

pub async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignReviewerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let outcome = state
        .service
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await?;
    Ok(Json(ReassignReviewerResponse {
        pr: outcome.pull_request,
        replaced_by: outcome.replaced_by,
    }))
}

pub async fn get_pull_request(
    State(state): State<AppState>,
    Query(query): Query<PullRequestQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pull_request_id = required_param(query.pull_request_id, "pull_request_id")?;
    let pr = state.service.get_pull_request(&pull_request_id).await?;
    Ok(Json(PullRequestResponse { pr }))
}
