use axum::{extract::State, http::StatusCode, Json};
use tracing::instrument;

use super::dto::{AuthResponse, LoginRequest, SignupRequest};
use super::services;
use crate::{error::ApiError, extract::ValidJson, state::AppState};

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let resp = services::create_applicant(&*state.repo, &state.tokens, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let resp = services::login(&*state.repo, &state.tokens, payload).await?;
    Ok(Json(resp))
}
