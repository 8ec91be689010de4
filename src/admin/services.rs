use tracing::info;
use uuid::Uuid;

use super::dto::{CreateAdminRequest, CreateCompanyRequest, CreateRecruiterRequest, UpdateCompanyRequest};
use crate::auth::services::create_account;
use crate::db::models::{Company, RoleExtension, User};
use crate::db::Repository;
use crate::error::ApiError;

pub async fn create_admin(repo: &dyn Repository, req: CreateAdminRequest) -> Result<User, ApiError> {
    let extension = RoleExtension::Admin {
        admin_level: req.admin_level,
    };
    create_account(repo, req.account, extension).await
}

pub async fn create_recruiter(repo: &dyn Repository, req: CreateRecruiterRequest) -> Result<User, ApiError> {
    let extension = RoleExtension::Recruiter {
        company_id: req.company_id,
    };
    create_account(repo, req.account, extension).await
}

pub async fn create_company(repo: &dyn Repository, req: &CreateCompanyRequest) -> Result<Company, ApiError> {
    let company = repo.create_company(req).await?;
    info!(company_id = %company.id, "company created");
    Ok(company)
}

pub async fn update_company(
    repo: &dyn Repository,
    id: Uuid,
    req: &UpdateCompanyRequest,
) -> Result<Company, ApiError> {
    let company = repo.update_company(id, req).await?;
    info!(company_id = %id, "company updated");
    Ok(company)
}

pub async fn delete_company(repo: &dyn Repository, id: Uuid) -> Result<(), ApiError> {
    repo.delete_company(id).await?;
    info!(company_id = %id, "company deleted");
    Ok(())
}
