use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{
    Certification, Company, Education, Experience, Media, MediaOwner, NewUser, PhoneNumber,
    Project, RoleExtension, Skill, User,
};
use super::{RepoError, RepoResult, Repository};
use crate::admin::dto::{CreateCompanyRequest, UpdateCompanyRequest};
use crate::profile::dto::{
    CertificationRequest, EducationRequest, ExperienceRequest, PhoneNumberRequest, ProjectRequest,
};

pub const SKILL_SEARCH_LIMIT: i64 = 50;

macro_rules! user_columns {
    () => {
        "id, email, password_hash, full_name, role, location, title, about_section, profile_url, created_at, updated_at"
    };
}

macro_rules! company_columns {
    () => {
        "id, name, description, created_at, updated_at"
    };
}

macro_rules! phone_columns {
    () => {
        "id, user_id, phone_number, phone_type, is_primary, created_at, updated_at"
    };
}

macro_rules! education_columns {
    () => {
        "id, user_id, institution_name, degree, field_of_study, start_date, end_date, is_current, \
         grade_gpa, description, created_at, updated_at"
    };
}

macro_rules! experience_columns {
    () => {
        "id, user_id, company_name, position_title, employment_type, start_date, end_date, is_current, \
         location, description, created_at, updated_at"
    };
}

macro_rules! certification_columns {
    () => {
        "id, user_id, certification_name, issuing_organization, issue_date, expiration_date, \
         credential_id, credential_url, description, created_at, updated_at"
    };
}

macro_rules! project_columns {
    () => {
        "id, user_id, project_name, description, start_date, end_date, is_ongoing, project_url, \
         created_at, updated_at"
    };
}

macro_rules! media_by_owner {
    ($fk:literal) => {
        concat!(
            "SELECT id, user_id, media_type, file_name, file_path, file_size, mime_type, alt_text, \
             description, education_id, experience_id, certification_id, project_id, created_at, updated_at \
             FROM user_media WHERE ",
            $fk,
            " = $1 ORDER BY created_at ASC"
        )
    };
}

/// One fixed statement per owner kind; the owner column is never spliced in at runtime.
fn media_query(owner: MediaOwner) -> &'static str {
    match owner {
        MediaOwner::Education(_) => media_by_owner!("education_id"),
        MediaOwner::Experience(_) => media_by_owner!("experience_id"),
        MediaOwner::Certification(_) => media_by_owner!("certification_id"),
        MediaOwner::Project(_) => media_by_owner!("project_id"),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map_or(false, |db| db.is_unique_violation())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map_or(false, |db| db.is_foreign_key_violation())
}

/// Escapes LIKE wildcards so user input only ever matches literally.
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Serialises primary-flag changes for one user. Locks the owning `users` row, so it also
/// holds when the user has no phone numbers yet. `NO KEY UPDATE` leaves foreign-key checks
/// from other child inserts unblocked.
async fn lock_user_phones(tx: &mut sqlx::PgConnection, user_id: Uuid) -> RepoResult<()> {
    sqlx::query(r#"SELECT 1 FROM users WHERE id = $1 FOR NO KEY UPDATE"#)
        .bind(user_id)
        .execute(tx)
        .await
        .context("lock user phone numbers")?;
    Ok(())
}

#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, user: NewUser, extension: RoleExtension) -> RepoResult<User> {
        // Dropping `tx` on any early return rolls the whole signup back.
        let mut tx = self.db.begin().await.context("begin create_user")?;

        let created = sqlx::query_as::<_, User>(concat!(
            "INSERT INTO users (email, password_hash, full_name, role) VALUES ($1, $2, $3, $4) RETURNING ",
            user_columns!()
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(extension.role().as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::DuplicateEmail
            } else {
                RepoError::from(e).context("insert user")
            }
        })?;

        match extension {
            RoleExtension::Applicant => {}
            RoleExtension::Admin { admin_level } => {
                sqlx::query(r#"INSERT INTO admins (user_id, admin_level) VALUES ($1, $2)"#)
                    .bind(created.id)
                    .bind(admin_level)
                    .execute(&mut *tx)
                    .await
                    .context("insert admin")?;
            }
            RoleExtension::Recruiter { company_id } => {
                sqlx::query(r#"INSERT INTO recruiters (user_id, company_id) VALUES ($1, $2)"#)
                    .bind(created.id)
                    .bind(company_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        if is_foreign_key_violation(&e) {
                            RepoError::InvalidReference("company")
                        } else {
                            RepoError::from(e).context("insert recruiter")
                        }
                    })?;
            }
        }

        tx.commit().await.context("commit create_user")?;
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn create_company(&self, req: &CreateCompanyRequest) -> RepoResult<Company> {
        let company = sqlx::query_as::<_, Company>(concat!(
            "INSERT INTO companies (name, description) VALUES ($1, $2) RETURNING ",
            company_columns!()
        ))
        .bind(&req.name)
        .bind(&req.description)
        .fetch_one(&self.db)
        .await
        .context("insert company")?;
        Ok(company)
    }

    async fn update_company(&self, id: Uuid, req: &UpdateCompanyRequest) -> RepoResult<Company> {
        let mut tx = self.db.begin().await.context("begin update_company")?;

        let exists = sqlx::query_scalar::<_, bool>(r#"SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1)"#)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .context("check company exists")?;
        if !exists {
            return Err(RepoError::NotFound("company"));
        }

        let company = sqlx::query_as::<_, Company>(concat!(
            "UPDATE companies SET name = COALESCE($2, name), description = COALESCE($3, description), \
             updated_at = NOW() WHERE id = $1 RETURNING ",
            company_columns!()
        ))
        .bind(id)
        .bind(req.name.as_deref())
        .bind(req.description.as_deref())
        .fetch_one(&mut *tx)
        .await
        .context("update company")?;

        tx.commit().await.context("commit update_company")?;
        Ok(company)
    }

    async fn delete_company(&self, id: Uuid) -> RepoResult<()> {
        let mut tx = self.db.begin().await.context("begin delete_company")?;

        let exists = sqlx::query_scalar::<_, bool>(r#"SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1)"#)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .context("check company exists")?;
        if !exists {
            return Err(RepoError::NotFound("company"));
        }

        sqlx::query(r#"DELETE FROM companies WHERE id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete company")?;

        tx.commit().await.context("commit delete_company")?;
        Ok(())
    }

    async fn list_phone_numbers(&self, user_id: Uuid) -> RepoResult<Vec<PhoneNumber>> {
        let rows = sqlx::query_as::<_, PhoneNumber>(concat!(
            "SELECT ",
            phone_columns!(),
            " FROM user_phone_numbers WHERE user_id = $1 ORDER BY is_primary DESC, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list phone numbers")?;
        Ok(rows)
    }

    async fn create_phone_number(&self, user_id: Uuid, req: &PhoneNumberRequest) -> RepoResult<PhoneNumber> {
        let mut tx = self.db.begin().await.context("begin create_phone_number")?;

        if req.is_primary {
            lock_user_phones(&mut *tx, user_id).await?;
            sqlx::query(
                r#"UPDATE user_phone_numbers SET is_primary = FALSE, updated_at = NOW()
                   WHERE user_id = $1 AND is_primary"#,
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("clear primary phone")?;
        }

        let phone = sqlx::query_as::<_, PhoneNumber>(concat!(
            "INSERT INTO user_phone_numbers (user_id, phone_number, phone_type, is_primary) \
             VALUES ($1, $2, $3, $4) RETURNING ",
            phone_columns!()
        ))
        .bind(user_id)
        .bind(&req.phone_number)
        .bind(&req.phone_type)
        .bind(req.is_primary)
        .fetch_one(&mut *tx)
        .await
        .context("insert phone number")?;

        tx.commit().await.context("commit create_phone_number")?;
        Ok(phone)
    }

    async fn update_phone_number(&self, user_id: Uuid, id: Uuid, req: &PhoneNumberRequest) -> RepoResult<PhoneNumber> {
        let mut tx = self.db.begin().await.context("begin update_phone_number")?;

        if req.is_primary {
            lock_user_phones(&mut *tx, user_id).await?;
            sqlx::query(
                r#"UPDATE user_phone_numbers SET is_primary = FALSE, updated_at = NOW()
                   WHERE user_id = $1 AND id <> $2 AND is_primary"#,
            )
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("clear primary phone")?;
        }

        let phone = sqlx::query_as::<_, PhoneNumber>(concat!(
            "UPDATE user_phone_numbers SET phone_number = $3, phone_type = $4, is_primary = $5, \
             updated_at = NOW() WHERE id = $1 AND user_id = $2 RETURNING ",
            phone_columns!()
        ))
        .bind(id)
        .bind(user_id)
        .bind(&req.phone_number)
        .bind(&req.phone_type)
        .bind(req.is_primary)
        .fetch_optional(&mut *tx)
        .await
        .context("update phone number")?
        .ok_or(RepoError::NotFound("phone number"))?;

        tx.commit().await.context("commit update_phone_number")?;
        Ok(phone)
    }

    async fn delete_phone_number(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let res = sqlx::query(r#"DELETE FROM user_phone_numbers WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete phone number")?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("phone number"));
        }
        Ok(())
    }

    async fn list_education(&self, user_id: Uuid) -> RepoResult<Vec<Education>> {
        let rows = sqlx::query_as::<_, Education>(concat!(
            "SELECT ",
            education_columns!(),
            " FROM user_education WHERE user_id = $1 \
             ORDER BY is_current DESC, end_date DESC NULLS FIRST, start_date DESC, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list education")?;
        Ok(rows)
    }

    async fn create_education(&self, user_id: Uuid, req: &EducationRequest) -> RepoResult<Education> {
        let row = sqlx::query_as::<_, Education>(concat!(
            "INSERT INTO user_education (user_id, institution_name, degree, field_of_study, start_date, \
             end_date, is_current, grade_gpa, description) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
            education_columns!()
        ))
        .bind(user_id)
        .bind(&req.institution_name)
        .bind(&req.degree)
        .bind(req.field_of_study.as_deref())
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.is_current)
        .bind(req.grade_gpa.as_deref())
        .bind(req.description.as_deref())
        .fetch_one(&self.db)
        .await
        .context("insert education")?;
        Ok(row)
    }

    async fn update_education(&self, user_id: Uuid, id: Uuid, req: &EducationRequest) -> RepoResult<Education> {
        sqlx::query_as::<_, Education>(concat!(
            "UPDATE user_education SET institution_name = $3, degree = $4, field_of_study = $5, \
             start_date = $6, end_date = $7, is_current = $8, grade_gpa = $9, description = $10, \
             updated_at = NOW() WHERE id = $1 AND user_id = $2 RETURNING ",
            education_columns!()
        ))
        .bind(id)
        .bind(user_id)
        .bind(&req.institution_name)
        .bind(&req.degree)
        .bind(req.field_of_study.as_deref())
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.is_current)
        .bind(req.grade_gpa.as_deref())
        .bind(req.description.as_deref())
        .fetch_optional(&self.db)
        .await
        .context("update education")?
        .ok_or(RepoError::NotFound("education"))
    }

    async fn delete_education(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let res = sqlx::query(r#"DELETE FROM user_education WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete education")?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("education"));
        }
        Ok(())
    }

    async fn list_experience(&self, user_id: Uuid) -> RepoResult<Vec<Experience>> {
        let rows = sqlx::query_as::<_, Experience>(concat!(
            "SELECT ",
            experience_columns!(),
            " FROM user_experience WHERE user_id = $1 \
             ORDER BY is_current DESC, end_date DESC NULLS FIRST, start_date DESC, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list experience")?;
        Ok(rows)
    }

    async fn create_experience(&self, user_id: Uuid, req: &ExperienceRequest) -> RepoResult<Experience> {
        let row = sqlx::query_as::<_, Experience>(concat!(
            "INSERT INTO user_experience (user_id, company_name, position_title, employment_type, start_date, \
             end_date, is_current, location, description) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
            experience_columns!()
        ))
        .bind(user_id)
        .bind(&req.company_name)
        .bind(&req.position_title)
        .bind(&req.employment_type)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.is_current)
        .bind(req.location.as_deref())
        .bind(req.description.as_deref())
        .fetch_one(&self.db)
        .await
        .context("insert experience")?;
        Ok(row)
    }

    async fn update_experience(&self, user_id: Uuid, id: Uuid, req: &ExperienceRequest) -> RepoResult<Experience> {
        sqlx::query_as::<_, Experience>(concat!(
            "UPDATE user_experience SET company_name = $3, position_title = $4, employment_type = $5, \
             start_date = $6, end_date = $7, is_current = $8, location = $9, description = $10, \
             updated_at = NOW() WHERE id = $1 AND user_id = $2 RETURNING ",
            experience_columns!()
        ))
        .bind(id)
        .bind(user_id)
        .bind(&req.company_name)
        .bind(&req.position_title)
        .bind(&req.employment_type)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.is_current)
        .bind(req.location.as_deref())
        .bind(req.description.as_deref())
        .fetch_optional(&self.db)
        .await
        .context("update experience")?
        .ok_or(RepoError::NotFound("experience"))
    }

    async fn delete_experience(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let res = sqlx::query(r#"DELETE FROM user_experience WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete experience")?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("experience"));
        }
        Ok(())
    }

    async fn list_certifications(&self, user_id: Uuid) -> RepoResult<Vec<Certification>> {
        let rows = sqlx::query_as::<_, Certification>(concat!(
            "SELECT ",
            certification_columns!(),
            " FROM user_certifications WHERE user_id = $1 \
             ORDER BY issue_date DESC NULLS LAST, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list certifications")?;
        Ok(rows)
    }

    async fn create_certification(&self, user_id: Uuid, req: &CertificationRequest) -> RepoResult<Certification> {
        let row = sqlx::query_as::<_, Certification>(concat!(
            "INSERT INTO user_certifications (user_id, certification_name, issuing_organization, issue_date, \
             expiration_date, credential_id, credential_url, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            certification_columns!()
        ))
        .bind(user_id)
        .bind(&req.certification_name)
        .bind(&req.issuing_organization)
        .bind(req.issue_date)
        .bind(req.expiration_date)
        .bind(req.credential_id.as_deref())
        .bind(req.credential_url.as_deref())
        .bind(req.description.as_deref())
        .fetch_one(&self.db)
        .await
        .context("insert certification")?;
        Ok(row)
    }

    async fn update_certification(&self, user_id: Uuid, id: Uuid, req: &CertificationRequest) -> RepoResult<Certification> {
        sqlx::query_as::<_, Certification>(concat!(
            "UPDATE user_certifications SET certification_name = $3, issuing_organization = $4, \
             issue_date = $5, expiration_date = $6, credential_id = $7, credential_url = $8, \
             description = $9, updated_at = NOW() WHERE id = $1 AND user_id = $2 RETURNING ",
            certification_columns!()
        ))
        .bind(id)
        .bind(user_id)
        .bind(&req.certification_name)
        .bind(&req.issuing_organization)
        .bind(req.issue_date)
        .bind(req.expiration_date)
        .bind(req.credential_id.as_deref())
        .bind(req.credential_url.as_deref())
        .bind(req.description.as_deref())
        .fetch_optional(&self.db)
        .await
        .context("update certification")?
        .ok_or(RepoError::NotFound("certification"))
    }

    async fn delete_certification(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let res = sqlx::query(r#"DELETE FROM user_certifications WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete certification")?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("certification"));
        }
        Ok(())
    }

    async fn list_projects(&self, user_id: Uuid) -> RepoResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>(concat!(
            "SELECT ",
            project_columns!(),
            " FROM user_projects WHERE user_id = $1 \
             ORDER BY is_ongoing DESC, end_date DESC NULLS FIRST, start_date DESC, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list projects")?;
        Ok(rows)
    }

    async fn create_project(&self, user_id: Uuid, req: &ProjectRequest) -> RepoResult<Project> {
        let row = sqlx::query_as::<_, Project>(concat!(
            "INSERT INTO user_projects (user_id, project_name, description, start_date, end_date, \
             is_ongoing, project_url) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
            project_columns!()
        ))
        .bind(user_id)
        .bind(&req.project_name)
        .bind(req.description.as_deref())
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.is_ongoing)
        .bind(req.project_url.as_deref())
        .fetch_one(&self.db)
        .await
        .context("insert project")?;
        Ok(row)
    }

    async fn update_project(&self, user_id: Uuid, id: Uuid, req: &ProjectRequest) -> RepoResult<Project> {
        sqlx::query_as::<_, Project>(concat!(
            "UPDATE user_projects SET project_name = $3, description = $4, start_date = $5, \
             end_date = $6, is_ongoing = $7, project_url = $8, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 RETURNING ",
            project_columns!()
        ))
        .bind(id)
        .bind(user_id)
        .bind(&req.project_name)
        .bind(req.description.as_deref())
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.is_ongoing)
        .bind(req.project_url.as_deref())
        .fetch_optional(&self.db)
        .await
        .context("update project")?
        .ok_or(RepoError::NotFound("project"))
    }

    async fn delete_project(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let res = sqlx::query(r#"DELETE FROM user_projects WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete project")?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("project"));
        }
        Ok(())
    }

    async fn list_media(&self, owner: MediaOwner) -> RepoResult<Vec<Media>> {
        let rows = sqlx::query_as::<_, Media>(media_query(owner))
            .bind(owner.id())
            .fetch_all(&self.db)
            .await
            .context("list media")?;
        Ok(rows)
    }

    async fn search_skills(&self, query: &str) -> RepoResult<Vec<Skill>> {
        let rows = sqlx::query_as::<_, Skill>(
            r#"SELECT id, name FROM skills WHERE name ILIKE $1 ESCAPE '\' ORDER BY name ASC LIMIT $2"#,
        )
        .bind(like_pattern(query))
        .bind(SKILL_SEARCH_LIMIT)
        .fetch_all(&self.db)
        .await
        .context("search skills")?;
        Ok(rows)
    }

    async fn list_user_skills(&self, user_id: Uuid) -> RepoResult<Vec<Skill>> {
        let rows = sqlx::query_as::<_, Skill>(
            r#"
            SELECT s.id, s.name
            FROM skills s
            JOIN user_skills us ON us.skill_id = s.id
            WHERE us.user_id = $1
            ORDER BY s.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list user skills")?;
        Ok(rows)
    }

    async fn add_user_skills(&self, user_id: Uuid, skill_ids: &[i32]) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_skills (user_id, skill_id)
            SELECT $1, UNNEST($2::int4[])
            ON CONFLICT (user_id, skill_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(skill_ids)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                RepoError::InvalidReference("skill")
            } else {
                RepoError::from(e).context("add user skills")
            }
        })?;
        Ok(())
    }

    async fn remove_user_skill(&self, user_id: Uuid, skill_id: i32) -> RepoResult<()> {
        let res = sqlx::query(r#"DELETE FROM user_skills WHERE user_id = $1 AND skill_id = $2"#)
            .bind(user_id)
            .bind(skill_id)
            .execute(&self.db)
            .await
            .context("remove user skill")?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound("skill"));
        }
        Ok(())
    }
}
