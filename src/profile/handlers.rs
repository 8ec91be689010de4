use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, instrument};
use uuid::Uuid;

use super::aggregate::get_user_profile;
use super::dto::AddSkillsRequest;
use super::entries::ProfileEntry;
use crate::{
    auth::middleware::AuthUser,
    db::models::{Skill, UserProfile},
    error::ApiError,
    extract::{ApiPath, ValidJson},
    state::AppState,
};

#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = get_user_profile(&*state.repo, claims.user_id()).await?;
    Ok(Json(profile))
}

#[instrument(skip(state, claims), fields(entry = E::NAME, user_id = %claims.sub))]
pub async fn list_entries<E: ProfileEntry>(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<E>>, ApiError> {
    Ok(Json(E::list(&*state.repo, claims.user_id()).await?))
}

#[instrument(skip(state, claims, payload), fields(entry = E::NAME, user_id = %claims.sub))]
pub async fn create_entry<E: ProfileEntry>(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidJson(payload): ValidJson<E::Request>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    let row = E::create(&*state.repo, claims.user_id(), &payload).await?;
    info!("{} added", E::NAME);
    Ok((StatusCode::CREATED, Json(row)))
}

#[instrument(skip(state, claims, payload), fields(entry = E::NAME, user_id = %claims.sub))]
pub async fn update_entry<E: ProfileEntry>(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(payload): ValidJson<E::Request>,
) -> Result<Json<E>, ApiError> {
    Ok(Json(E::update(&*state.repo, claims.user_id(), id, &payload).await?))
}

#[instrument(skip(state, claims), fields(entry = E::NAME, user_id = %claims.sub))]
pub async fn delete_entry<E: ProfileEntry>(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    E::delete(&*state.repo, claims.user_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn list_skills(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<Skill>>, ApiError> {
    Ok(Json(state.repo.list_user_skills(claims.user_id()).await?))
}

#[instrument(skip(state, claims, payload), fields(user_id = %claims.sub))]
pub async fn add_skills(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidJson(payload): ValidJson<AddSkillsRequest>,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let user_id = claims.user_id();
    state.repo.add_user_skills(user_id, &payload.skill_ids).await?;
    Ok(Json(state.repo.list_user_skills(user_id).await?))
}

#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn remove_skill(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiPath(skill_id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    state.repo.remove_user_skill(claims.user_id(), skill_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
