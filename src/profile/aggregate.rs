use std::future::Future;

use tracing::debug;
use uuid::Uuid;

use crate::db::models::{HasMedia, UserProfile};
use crate::db::{RepoError, RepoResult, Repository};

async fn step<T>(name: &'static str, fut: impl Future<Output = RepoResult<T>>) -> RepoResult<T> {
    fut.await.map_err(|e| e.context(name))
}

/// Loads each row's media, oldest first. The first failed lookup fails the batch.
pub async fn with_media<T: HasMedia>(repo: &dyn Repository, mut rows: Vec<T>) -> RepoResult<Vec<T>> {
    for row in rows.iter_mut() {
        let media = repo.list_media(row.media_owner()).await?;
        row.set_media(media);
    }
    Ok(rows)
}

/// Builds the full profile of `user_id`.
///
/// The six collections are fetched concurrently; each keeps its own fixed order,
/// so the result does not depend on which query finishes first. Any failure after
/// the user row is found aborts the whole read as an internal error naming the step.
pub async fn get_user_profile(repo: &dyn Repository, user_id: Uuid) -> RepoResult<UserProfile> {
    let user = step("load user", repo.find_user_by_id(user_id))
        .await?
        .ok_or(RepoError::NotFound("user"))?;

    let (phone_numbers, education, experience, certifications, projects, skills) = tokio::try_join!(
        step("load phone numbers", repo.list_phone_numbers(user_id)),
        step("load education", async {
            with_media(repo, repo.list_education(user_id).await?).await
        }),
        step("load experience", async {
            with_media(repo, repo.list_experience(user_id).await?).await
        }),
        step("load certifications", async {
            with_media(repo, repo.list_certifications(user_id).await?).await
        }),
        step("load projects", async {
            with_media(repo, repo.list_projects(user_id).await?).await
        }),
        step("load skills", repo.list_user_skills(user_id)),
    )?;

    debug!(
        %user_id,
        education = education.len(),
        experience = experience.len(),
        skills = skills.len(),
        "profile assembled"
    );
    Ok(UserProfile {
        user,
        phone_numbers,
        education,
        experience,
        certifications,
        projects,
        skills,
    })
}
