use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    response::IntoResponse,
};
use reviewer_types::api::{SetIsActiveRequest, UserQuery, UserResponse, UserReviewsResponse};

use crate::AppState;
use crate::error::{ApiError, json_body, required_param};

pub async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let user = state.service.set_user_active(&req.user_id, req.is_active).await?;
    Ok(Json(UserResponse { user }))
}

pub async fn get_review(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = required_param(query.user_id, "user_id")?;
    let pull_requests = state.service.get_user_reviews(&user_id).await?;
    Ok(Json(UserReviewsResponse {
        user_id,
        pull_requests,
    }))
}
