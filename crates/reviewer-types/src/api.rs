use serde::{Deserialize, Serialize};

use crate::models::{NewTeamMember, PullRequest, Team, User};

// Request bodies default missing fields so that absent ids surface as
// validation errors rather than JSON rejections.

// -- Teams --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTeamRequest {
    pub team_name: String,
    pub members: Vec<NewTeamMember>,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: Team,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetIsActiveRequest {
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserReviewsResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequest>,
}

// -- Pull requests --

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MergePullRequestRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReassignReviewerRequest {
    pub pull_request_id: String,
    pub old_user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestQuery {
    pub pull_request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PullRequestResponse {
    pub pr: PullRequest,
}

#[derive(Debug, Serialize)]
pub struct ReassignReviewerResponse {
    pub pr: PullRequest,
    pub replaced_by: String,
}

// -- Errors / health --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
