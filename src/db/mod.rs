pub mod models;
pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::admin::dto::{CreateCompanyRequest, UpdateCompanyRequest};
use crate::profile::dto::{
    CertificationRequest, EducationRequest, ExperienceRequest, PhoneNumberRequest, ProjectRequest,
};
use models::{
    Certification, Company, Education, Experience, Media, MediaOwner, NewUser, PhoneNumber,
    Project, RoleExtension, Skill, User,
};

pub use postgres::PgRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The row is absent, or belongs to someone other than the caller.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("unknown {0}")]
    InvalidReference(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        RepoError::Internal(e.into())
    }
}

impl RepoError {
    /// Wraps the error as an internal failure of the named step.
    pub fn context(self, step: &'static str) -> Self {
        match self {
            RepoError::Internal(e) => RepoError::Internal(e.context(step)),
            other => RepoError::Internal(anyhow::Error::new(other).context(step)),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Everything the handlers need from the credential store.
///
/// Every mutation of a profile entry is scoped by `user_id`: a row owned by another user
/// behaves exactly like a missing one. Collection reads come back in display order but
/// without media; see [`crate::profile::aggregate`] for attaching it.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Inserts the user and its role-extension row atomically.
    async fn create_user(&self, user: NewUser, extension: RoleExtension) -> RepoResult<User>;
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    async fn create_company(&self, req: &CreateCompanyRequest) -> RepoResult<Company>;
    /// Overwrites only the fields present in `req` and bumps `updated_at`.
    async fn update_company(&self, id: Uuid, req: &UpdateCompanyRequest) -> RepoResult<Company>;
    async fn delete_company(&self, id: Uuid) -> RepoResult<()>;

    async fn list_phone_numbers(&self, user_id: Uuid) -> RepoResult<Vec<PhoneNumber>>;
    async fn create_phone_number(&self, user_id: Uuid, req: &PhoneNumberRequest) -> RepoResult<PhoneNumber>;
    async fn update_phone_number(&self, user_id: Uuid, id: Uuid, req: &PhoneNumberRequest) -> RepoResult<PhoneNumber>;
    async fn delete_phone_number(&self, user_id: Uuid, id: Uuid) -> RepoResult<()>;

    async fn list_education(&self, user_id: Uuid) -> RepoResult<Vec<Education>>;
    async fn create_education(&self, user_id: Uuid, req: &EducationRequest) -> RepoResult<Education>;
    async fn update_education(&self, user_id: Uuid, id: Uuid, req: &EducationRequest) -> RepoResult<Education>;
    async fn delete_education(&self, user_id: Uuid, id: Uuid) -> RepoResult<()>;

    async fn list_experience(&self, user_id: Uuid) -> RepoResult<Vec<Experience>>;
    async fn create_experience(&self, user_id: Uuid, req: &ExperienceRequest) -> RepoResult<Experience>;
    async fn update_experience(&self, user_id: Uuid, id: Uuid, req: &ExperienceRequest) -> RepoResult<Experience>;
    async fn delete_experience(&self, user_id: Uuid, id: Uuid) -> RepoResult<()>;

    async fn list_certifications(&self, user_id: Uuid) -> RepoResult<Vec<Certification>>;
    async fn create_certification(&self, user_id: Uuid, req: &CertificationRequest) -> RepoResult<Certification>;
    async fn update_certification(&self, user_id: Uuid, id: Uuid, req: &CertificationRequest) -> RepoResult<Certification>;
    async fn delete_certification(&self, user_id: Uuid, id: Uuid) -> RepoResult<()>;

    async fn list_projects(&self, user_id: Uuid) -> RepoResult<Vec<Project>>;
    async fn create_project(&self, user_id: Uuid, req: &ProjectRequest) -> RepoResult<Project>;
    async fn update_project(&self, user_id: Uuid, id: Uuid, req: &ProjectRequest) -> RepoResult<Project>;
    async fn delete_project(&self, user_id: Uuid, id: Uuid) -> RepoResult<()>;

    /// Media of one entry, oldest first.
    async fn list_media(&self, owner: MediaOwner) -> RepoResult<Vec<Media>>;

    async fn search_skills(&self, query: &str) -> RepoResult<Vec<Skill>>;
    async fn list_user_skills(&self, user_id: Uuid) -> RepoResult<Vec<Skill>>;
    /// Attaching an already attached skill is a no-op.
    async fn add_user_skills(&self, user_id: Uuid, skill_ids: &[i32]) -> RepoResult<()>;
    async fn remove_user_skill(&self, user_id: Uuid, skill_id: i32) -> RepoResult<()>;
}
