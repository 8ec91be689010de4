use axum::{extract::State, http::StatusCode, Json};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    CompanyResponse, CreateAdminRequest, CreateCompanyRequest, CreateRecruiterRequest,
    CreateUserResponse, MessageResponse, UpdateCompanyRequest,
};
use super::services;
use crate::{
    error::ApiError,
    extract::{ApiPath, ValidJson},
    state::AppState,
};

#[instrument(skip(state, payload))]
pub async fn create_admin(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let user = services::create_admin(&*state.repo, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "admin created successfully".into(),
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_recruiter(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateRecruiterRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let user = services::create_recruiter(&*state.repo, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "recruiter created successfully".into(),
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_company(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let company = services::create_company(&*state.repo, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CompanyResponse {
            message: "company created successfully".into(),
            company,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_company(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateCompanyRequest>,
) -> Result<Json<CompanyResponse>, ApiError> {
    let company = services::update_company(&*state.repo, id, &payload).await?;
    Ok(Json(CompanyResponse {
        message: "company updated successfully".into(),
        company,
    }))
}

#[instrument(skip(state))]
pub async fn delete_company(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_company(&*state.repo, id).await?;
    Ok(Json(MessageResponse {
        message: "company deleted successfully".into(),
    }))
}
