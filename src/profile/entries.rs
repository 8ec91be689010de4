use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use super::aggregate::with_media;
use super::dto::{
    CertificationRequest, EducationRequest, ExperienceRequest, PhoneNumberRequest, ProjectRequest,
};
use crate::db::models::{Certification, Education, Experience, HasMedia, PhoneNumber, Project};
use crate::db::{RepoResult, Repository};
use crate::validate::Validate;

/// A profile collection owned by one user; every call is scoped to `user_id`.
#[async_trait]
pub trait ProfileEntry: Serialize + Send + Sized + 'static {
    type Request: DeserializeOwned + Validate + Send + Sync + 'static;

    const NAME: &'static str;

    async fn list(repo: &dyn Repository, user_id: Uuid) -> RepoResult<Vec<Self>>;
    async fn create(repo: &dyn Repository, user_id: Uuid, req: &Self::Request) -> RepoResult<Self>;
    async fn update(repo: &dyn Repository, user_id: Uuid, id: Uuid, req: &Self::Request) -> RepoResult<Self>;
    async fn delete(repo: &dyn Repository, user_id: Uuid, id: Uuid) -> RepoResult<()>;
}

#[async_trait]
impl ProfileEntry for PhoneNumber {
    type Request = PhoneNumberRequest;

    const NAME: &'static str = "phone number";

    async fn list(repo: &dyn Repository, user_id: Uuid) -> RepoResult<Vec<Self>> {
        repo.list_phone_numbers(user_id).await
    }

    async fn create(repo: &dyn Repository, user_id: Uuid, req: &Self::Request) -> RepoResult<Self> {
        repo.create_phone_number(user_id, req).await
    }

    async fn update(repo: &dyn Repository, user_id: Uuid, id: Uuid, req: &Self::Request) -> RepoResult<Self> {
        repo.update_phone_number(user_id, id, req).await
    }

    async fn delete(repo: &dyn Repository, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        repo.delete_phone_number(user_id, id).await
    }
}

// Entries that carry media come back with it attached, as in the aggregate.
macro_rules! entry_with_media {
    ($ty:ty, $req:ty, $name:literal, $list:ident, $create:ident, $update:ident, $delete:ident) => {
        #[async_trait]
        impl ProfileEntry for $ty {
            type Request = $req;

            const NAME: &'static str = $name;

            async fn list(repo: &dyn Repository, user_id: Uuid) -> RepoResult<Vec<Self>> {
                with_media(repo, repo.$list(user_id).await?).await
            }

            async fn create(repo: &dyn Repository, user_id: Uuid, req: &Self::Request) -> RepoResult<Self> {
                repo.$create(user_id, req).await
            }

            async fn update(
                repo: &dyn Repository,
                user_id: Uuid,
                id: Uuid,
                req: &Self::Request,
            ) -> RepoResult<Self> {
                let mut row = repo.$update(user_id, id, req).await?;
                row.set_media(repo.list_media(row.media_owner()).await?);
                Ok(row)
            }

            async fn delete(repo: &dyn Repository, user_id: Uuid, id: Uuid) -> RepoResult<()> {
                repo.$delete(user_id, id).await
            }
        }
    };
}

entry_with_media!(Education, EducationRequest, "education", list_education, create_education, update_education, delete_education);
entry_with_media!(Experience, ExperienceRequest, "experience", list_experience, create_experience, update_experience, delete_experience);
entry_with_media!(
    Certification,
    CertificationRequest,
    "certification",
    list_certifications,
    create_certification,
    update_certification,
    delete_certification
);
entry_with_media!(Project, ProjectRequest, "project", list_projects, create_project, update_project, delete_project);
