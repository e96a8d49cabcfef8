pub mod error;
pub mod health;
pub mod pull_requests;
pub mod teams;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use reviewer_core::ReviewService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub service: ReviewService,
}

/// All routes, without transport layers. The server adds CORS, tracing and
/// timeouts on top.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/team/add", post(teams::add_team))
        .route("/team/get", get(teams::get_team))
        .route("/users/setIsActive", post(users::set_is_active))
        .route("/users/getReview", get(users::get_review))
        .route("/pullRequest/create", post(pull_requests::create_pull_request))
        .route("/pullRequest/merge", post(pull_requests::merge_pull_request))
        .route("/pullRequest/reassign", post(pull_requests::reassign_reviewer))
        .route("/pullRequest/get", get(pull_requests::get_pull_request))
        .route("/health", get(health::health_check))
        .with_state(state)
}
