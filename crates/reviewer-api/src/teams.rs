use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use reviewer_types::api::{CreateTeamRequest, TeamQuery, TeamResponse};

use crate::AppState;
use crate::error::{ApiError, json_body, required_param};

pub async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<CreateTeamRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let team = state.service.create_team(&req.team_name, req.members).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

pub async fn get_team(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let team_name = required_param(query.team_name, "team_name")?;
    let team = state.service.get_team(&team_name).await?;
    Ok(Json(TeamResponse { team }))
}
