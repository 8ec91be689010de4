use tracing::{info, warn};

use super::dto::{AuthResponse, LoginRequest, SignupRequest};
use super::jwt::TokenService;
use super::password::{hash_password_blocking, verify_dummy_blocking, verify_password_blocking};
use crate::db::models::{NewUser, RoleExtension, User};
use crate::db::{RepoError, Repository};
use crate::error::ApiError;

/// Hashes the password, then writes the user and its role row in one transaction.
pub async fn create_account(
    repo: &dyn Repository,
    req: SignupRequest,
    extension: RoleExtension,
) -> Result<User, ApiError> {
    let password_hash = hash_password_blocking(req.password).await?;
    let user = repo
        .create_user(
            NewUser {
                email: req.email,
                password_hash,
                full_name: req.full_name,
            },
            extension,
        )
        .await
        .map_err(|e| {
            if matches!(e, RepoError::DuplicateEmail) {
                warn!("email already registered");
            }
            ApiError::from(e)
        })?;
    info!(user_id = %user.id, role = %user.role, "account created");
    Ok(user)
}

pub async fn create_applicant(
    repo: &dyn Repository,
    tokens: &TokenService,
    req: SignupRequest,
) -> Result<AuthResponse, ApiError> {
    let user = create_account(repo, req, RoleExtension::Applicant).await?;
    let token = tokens.issue(&user)?;
    Ok(AuthResponse { token, user })
}

pub async fn login(
    repo: &dyn Repository,
    tokens: &TokenService,
    req: LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let invalid = || ApiError::Authentication("invalid credentials".into());

    let Some(user) = repo.find_user_by_email(&req.email).await? else {
        warn!(email = %req.email, "login unknown email");
        verify_dummy_blocking(req.password).await?;
        return Err(invalid());
    };

    if !verify_password_blocking(req.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let token = tokens.issue(&user)?;
    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(AuthResponse { token, user })
}
