use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use tracing::instrument;

use crate::{db::models::Skill, error::ApiError, extract::ApiQuery, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SkillSearch {
    pub q: Option<String>,
}

/// Case-insensitive substring search over the skill catalog, name ascending.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SkillSearch>,
) -> Result<Json<Vec<Skill>>, ApiError> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::Validation("query parameter q is required".into()))?;
    Ok(Json(state.repo.search_skills(query).await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/skills", get(search))
}
