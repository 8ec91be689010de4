use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use time::{Date, Duration, OffsetDateTime};
use uuid::Uuid;

use super::models::{
    Certification, Company, Education, Experience, Media, MediaOwner, NewUser, PhoneNumber,
    Project, RoleExtension, Skill, User,
};
use super::postgres::SKILL_SEARCH_LIMIT;
use super::{RepoError, RepoResult, Repository};
use crate::admin::dto::{CreateCompanyRequest, UpdateCompanyRequest};
use crate::profile::dto::{
    CertificationRequest, EducationRequest, ExperienceRequest, PhoneNumberRequest, ProjectRequest,
};

const SEED_SKILLS: &[&str] = &["Docker", "Go", "Kubernetes", "PostgreSQL", "Rust", "TypeScript"];

/// In-process [`Repository`] with the same ordering, uniqueness and reference
/// rules as the Postgres schema. Cloning shares the underlying store.
#[derive(Clone)]
pub struct MemoryRepository {
    inner: Arc<Mutex<Store>>,
}

struct Store {
    clock: OffsetDateTime,
    users: Vec<User>,
    admins: HashMap<Uuid, i32>,
    recruiters: HashMap<Uuid, Option<Uuid>>,
    companies: Vec<Company>,
    phones: Vec<PhoneNumber>,
    education: Vec<Education>,
    experience: Vec<Experience>,
    certifications: Vec<Certification>,
    projects: Vec<Project>,
    media: Vec<Media>,
    skills: Vec<Skill>,
    user_skills: BTreeSet<(Uuid, i32)>,
    fail_media: bool,
}

impl Store {
    /// Strictly increasing timestamps so creation order is observable.
    fn tick(&mut self) -> OffsetDateTime {
        self.clock += Duration::milliseconds(1);
        self.clock
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        let skills = SEED_SKILLS
            .iter()
            .enumerate()
            .map(|(i, name)| Skill {
                id: i as i32 + 1,
                name: (*name).to_string(),
            })
            .collect();
        let store = Store {
            clock: OffsetDateTime::now_utc(),
            users: Vec::new(),
            admins: HashMap::new(),
            recruiters: HashMap::new(),
            companies: Vec::new(),
            phones: Vec::new(),
            education: Vec::new(),
            experience: Vec::new(),
            certifications: Vec::new(),
            projects: Vec::new(),
            media: Vec::new(),
            skills,
            user_skills: BTreeSet::new(),
            fail_media: false,
        };
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }
}

impl MemoryRepository {
    fn store(&self) -> MutexGuard<'_, Store> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn skill_id(&self, name: &str) -> Option<i32> {
        self.store().skills.iter().find(|s| s.name == name).map(|s| s.id)
    }

    /// Attaches a media row to `owner`, stamped after everything inserted so far.
    pub fn attach_media(&self, user_id: Uuid, owner: MediaOwner, file_name: &str) -> Media {
        let mut store = self.store();
        let now = store.tick();
        let mut media = Media {
            id: Uuid::new_v4(),
            user_id,
            media_type: "document".into(),
            file_name: file_name.into(),
            file_path: format!("/media/{file_name}"),
            file_size: None,
            mime_type: None,
            alt_text: None,
            description: None,
            education_id: None,
            experience_id: None,
            certification_id: None,
            project_id: None,
            created_at: now,
            updated_at: now,
        };
        match owner {
            MediaOwner::Education(id) => media.education_id = Some(id),
            MediaOwner::Experience(id) => media.experience_id = Some(id),
            MediaOwner::Certification(id) => media.certification_id = Some(id),
            MediaOwner::Project(id) => media.project_id = Some(id),
        }
        store.media.push(media.clone());
        media
    }

    /// Makes every later media lookup fail as if the database went away.
    pub fn fail_media_lookups(&self) {
        self.store().fail_media = true;
    }

    pub fn user_count(&self) -> usize {
        self.store().users.len()
    }

    pub fn admin_level(&self, user_id: Uuid) -> Option<i32> {
        self.store().admins.get(&user_id).copied()
    }

    pub fn recruiter_company(&self, user_id: Uuid) -> Option<Option<Uuid>> {
        self.store().recruiters.get(&user_id).copied()
    }
}

fn desc_nulls_first(a: Option<Date>, b: Option<Date>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}

fn desc_nulls_last(a: Option<Date>, b: Option<Date>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}

fn owned<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().filter(|r| pred(r)).cloned().collect()
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser, extension: RoleExtension) -> RepoResult<User> {
        let mut store = self.store();
        if store.users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::DuplicateEmail);
        }
        if let RoleExtension::Recruiter { company_id: Some(company_id) } = extension {
            if !store.companies.iter().any(|c| c.id == company_id) {
                return Err(RepoError::InvalidReference("company"));
            }
        }
        let now = store.tick();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            role: extension.role(),
            location: None,
            title: None,
            about_section: None,
            profile_url: None,
            created_at: now,
            updated_at: now,
        };
        match extension {
            RoleExtension::Applicant => {}
            RoleExtension::Admin { admin_level } => {
                store.admins.insert(created.id, admin_level);
            }
            RoleExtension::Recruiter { company_id } => {
                store.recruiters.insert(created.id, company_id);
            }
        }
        store.users.push(created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.store().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.store().users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_company(&self, req: &CreateCompanyRequest) -> RepoResult<Company> {
        let mut store = self.store();
        let now = store.tick();
        let company = Company {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            description: Some(req.description.clone()),
            created_at: now,
            updated_at: now,
        };
        store.companies.push(company.clone());
        Ok(company)
    }

    async fn update_company(&self, id: Uuid, req: &UpdateCompanyRequest) -> RepoResult<Company> {
        let mut store = self.store();
        let now = store.tick();
        let company = store
            .companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepoError::NotFound("company"))?;
        if let Some(name) = &req.name {
            company.name = name.clone();
        }
        if let Some(description) = &req.description {
            company.description = Some(description.clone());
        }
        company.updated_at = now;
        Ok(company.clone())
    }

    async fn delete_company(&self, id: Uuid) -> RepoResult<()> {
        let mut store = self.store();
        let before = store.companies.len();
        store.companies.retain(|c| c.id != id);
        if store.companies.len() == before {
            return Err(RepoError::NotFound("company"));
        }
        for company_id in store.recruiters.values_mut() {
            if *company_id == Some(id) {
                *company_id = None;
            }
        }
        Ok(())
    }

    async fn list_phone_numbers(&self, user_id: Uuid) -> RepoResult<Vec<PhoneNumber>> {
        let mut rows = owned(&self.store().phones, |p| p.user_id == user_id);
        rows.sort_by(|a, b| {
            b.is_primary
                .cmp(&a.is_primary)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(rows)
    }

    async fn create_phone_number(&self, user_id: Uuid, req: &PhoneNumberRequest) -> RepoResult<PhoneNumber> {
        let mut store = self.store();
        let now = store.tick();
        if req.is_primary {
            for phone in store.phones.iter_mut().filter(|p| p.user_id == user_id && p.is_primary) {
                phone.is_primary = false;
                phone.updated_at = now;
            }
        }
        let phone = PhoneNumber {
            id: Uuid::new_v4(),
            user_id,
            phone_number: req.phone_number.clone(),
            phone_type: req.phone_type.clone(),
            is_primary: req.is_primary,
            created_at: now,
            updated_at: now,
        };
        store.phones.push(phone.clone());
        Ok(phone)
    }

    async fn update_phone_number(&self, user_id: Uuid, id: Uuid, req: &PhoneNumberRequest) -> RepoResult<PhoneNumber> {
        let mut store = self.store();
        if !store.phones.iter().any(|p| p.id == id && p.user_id == user_id) {
            return Err(RepoError::NotFound("phone number"));
        }
        let now = store.tick();
        let mut updated = None;
        for phone in store.phones.iter_mut().filter(|p| p.user_id == user_id) {
            if phone.id == id {
                phone.phone_number = req.phone_number.clone();
                phone.phone_type = req.phone_type.clone();
                phone.is_primary = req.is_primary;
                phone.updated_at = now;
                updated = Some(phone.clone());
            } else if req.is_primary && phone.is_primary {
                phone.is_primary = false;
                phone.updated_at = now;
            }
        }
        updated.ok_or(RepoError::NotFound("phone number"))
    }

    async fn delete_phone_number(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let mut store = self.store();
        let before = store.phones.len();
        store.phones.retain(|p| !(p.id == id && p.user_id == user_id));
        if store.phones.len() == before {
            return Err(RepoError::NotFound("phone number"));
        }
        Ok(())
    }

    async fn list_education(&self, user_id: Uuid) -> RepoResult<Vec<Education>> {
        let mut rows = owned(&self.store().education, |e| e.user_id == user_id);
        rows.sort_by(|a, b| {
            b.is_current
                .cmp(&a.is_current)
                .then(desc_nulls_first(a.end_date, b.end_date))
                .then(desc_nulls_first(a.start_date, b.start_date))
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(rows)
    }

    async fn create_education(&self, user_id: Uuid, req: &EducationRequest) -> RepoResult<Education> {
        let mut store = self.store();
        let now = store.tick();
        let row = Education {
            id: Uuid::new_v4(),
            user_id,
            institution_name: req.institution_name.clone(),
            degree: req.degree.clone(),
            field_of_study: req.field_of_study.clone(),
            start_date: req.start_date,
            end_date: req.end_date,
            is_current: req.is_current,
            grade_gpa: req.grade_gpa.clone(),
            description: req.description.clone(),
            media: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        store.education.push(row.clone());
        Ok(row)
    }

    async fn update_education(&self, user_id: Uuid, id: Uuid, req: &EducationRequest) -> RepoResult<Education> {
        let mut store = self.store();
        let now = store.tick();
        let row = store
            .education
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
            .ok_or(RepoError::NotFound("education"))?;
        row.institution_name = req.institution_name.clone();
        row.degree = req.degree.clone();
        row.field_of_study = req.field_of_study.clone();
        row.start_date = req.start_date;
        row.end_date = req.end_date;
        row.is_current = req.is_current;
        row.grade_gpa = req.grade_gpa.clone();
        row.description = req.description.clone();
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete_education(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let mut store = self.store();
        let before = store.education.len();
        store.education.retain(|e| !(e.id == id && e.user_id == user_id));
        if store.education.len() == before {
            return Err(RepoError::NotFound("education"));
        }
        store.media.retain(|m| m.education_id != Some(id));
        Ok(())
    }

    async fn list_experience(&self, user_id: Uuid) -> RepoResult<Vec<Experience>> {
        let mut rows = owned(&self.store().experience, |e| e.user_id == user_id);
        rows.sort_by(|a, b| {
            b.is_current
                .cmp(&a.is_current)
                .then(desc_nulls_first(a.end_date, b.end_date))
                .then(desc_nulls_first(a.start_date, b.start_date))
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(rows)
    }

    async fn create_experience(&self, user_id: Uuid, req: &ExperienceRequest) -> RepoResult<Experience> {
        let mut store = self.store();
        let now = store.tick();
        let row = Experience {
            id: Uuid::new_v4(),
            user_id,
            company_name: req.company_name.clone(),
            position_title: req.position_title.clone(),
            employment_type: req.employment_type.clone(),
            start_date: req.start_date,
            end_date: req.end_date,
            is_current: req.is_current,
            location: req.location.clone(),
            description: req.description.clone(),
            media: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        store.experience.push(row.clone());
        Ok(row)
    }

    async fn update_experience(&self, user_id: Uuid, id: Uuid, req: &ExperienceRequest) -> RepoResult<Experience> {
        let mut store = self.store();
        let now = store.tick();
        let row = store
            .experience
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
            .ok_or(RepoError::NotFound("experience"))?;
        row.company_name = req.company_name.clone();
        row.position_title = req.position_title.clone();
        row.employment_type = req.employment_type.clone();
        row.start_date = req.start_date;
        row.end_date = req.end_date;
        row.is_current = req.is_current;
        row.location = req.location.clone();
        row.description = req.description.clone();
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete_experience(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let mut store = self.store();
        let before = store.experience.len();
        store.experience.retain(|e| !(e.id == id && e.user_id == user_id));
        if store.experience.len() == before {
            return Err(RepoError::NotFound("experience"));
        }
        store.media.retain(|m| m.experience_id != Some(id));
        Ok(())
    }

    async fn list_certifications(&self, user_id: Uuid) -> RepoResult<Vec<Certification>> {
        let mut rows = owned(&self.store().certifications, |c| c.user_id == user_id);
        rows.sort_by(|a, b| {
            desc_nulls_last(a.issue_date, b.issue_date).then(b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }

    async fn create_certification(&self, user_id: Uuid, req: &CertificationRequest) -> RepoResult<Certification> {
        let mut store = self.store();
        let now = store.tick();
        let row = Certification {
            id: Uuid::new_v4(),
            user_id,
            certification_name: req.certification_name.clone(),
            issuing_organization: req.issuing_organization.clone(),
            issue_date: req.issue_date,
            expiration_date: req.expiration_date,
            credential_id: req.credential_id.clone(),
            credential_url: req.credential_url.clone(),
            description: req.description.clone(),
            media: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        store.certifications.push(row.clone());
        Ok(row)
    }

    async fn update_certification(&self, user_id: Uuid, id: Uuid, req: &CertificationRequest) -> RepoResult<Certification> {
        let mut store = self.store();
        let now = store.tick();
        let row = store
            .certifications
            .iter_mut()
            .find(|c| c.id == id && c.user_id == user_id)
            .ok_or(RepoError::NotFound("certification"))?;
        row.certification_name = req.certification_name.clone();
        row.issuing_organization = req.issuing_organization.clone();
        row.issue_date = req.issue_date;
        row.expiration_date = req.expiration_date;
        row.credential_id = req.credential_id.clone();
        row.credential_url = req.credential_url.clone();
        row.description = req.description.clone();
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete_certification(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let mut store = self.store();
        let before = store.certifications.len();
        store.certifications.retain(|c| !(c.id == id && c.user_id == user_id));
        if store.certifications.len() == before {
            return Err(RepoError::NotFound("certification"));
        }
        store.media.retain(|m| m.certification_id != Some(id));
        Ok(())
    }

    async fn list_projects(&self, user_id: Uuid) -> RepoResult<Vec<Project>> {
        let mut rows = owned(&self.store().projects, |p| p.user_id == user_id);
        rows.sort_by(|a, b| {
            b.is_ongoing
                .cmp(&a.is_ongoing)
                .then(desc_nulls_first(a.end_date, b.end_date))
                .then(desc_nulls_first(a.start_date, b.start_date))
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(rows)
    }

    async fn create_project(&self, user_id: Uuid, req: &ProjectRequest) -> RepoResult<Project> {
        let mut store = self.store();
        let now = store.tick();
        let row = Project {
            id: Uuid::new_v4(),
            user_id,
            project_name: req.project_name.clone(),
            description: req.description.clone(),
            start_date: req.start_date,
            end_date: req.end_date,
            is_ongoing: req.is_ongoing,
            project_url: req.project_url.clone(),
            media: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        store.projects.push(row.clone());
        Ok(row)
    }

    async fn update_project(&self, user_id: Uuid, id: Uuid, req: &ProjectRequest) -> RepoResult<Project> {
        let mut store = self.store();
        let now = store.tick();
        let row = store
            .projects
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
            .ok_or(RepoError::NotFound("project"))?;
        row.project_name = req.project_name.clone();
        row.description = req.description.clone();
        row.start_date = req.start_date;
        row.end_date = req.end_date;
        row.is_ongoing = req.is_ongoing;
        row.project_url = req.project_url.clone();
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn delete_project(&self, user_id: Uuid, id: Uuid) -> RepoResult<()> {
        let mut store = self.store();
        let before = store.projects.len();
        store.projects.retain(|p| !(p.id == id && p.user_id == user_id));
        if store.projects.len() == before {
            return Err(RepoError::NotFound("project"));
        }
        store.media.retain(|m| m.project_id != Some(id));
        Ok(())
    }

    async fn list_media(&self, owner: MediaOwner) -> RepoResult<Vec<Media>> {
        let store = self.store();
        if store.fail_media {
            return Err(RepoError::Internal(anyhow::anyhow!("media store unavailable")));
        }
        let mut rows = owned(&store.media, |m| owner.owns(m));
        rows.sort_by_key(|m| m.created_at);
        Ok(rows)
    }

    async fn search_skills(&self, query: &str) -> RepoResult<Vec<Skill>> {
        let needle = query.to_lowercase();
        let mut rows = owned(&self.store().skills, |s| s.name.to_lowercase().contains(&needle));
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows.truncate(SKILL_SEARCH_LIMIT as usize);
        Ok(rows)
    }

    async fn list_user_skills(&self, user_id: Uuid) -> RepoResult<Vec<Skill>> {
        let store = self.store();
        let mut rows = owned(&store.skills, |s| store.user_skills.contains(&(user_id, s.id)));
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn add_user_skills(&self, user_id: Uuid, skill_ids: &[i32]) -> RepoResult<()> {
        let mut store = self.store();
        if skill_ids.iter().any(|id| !store.skills.iter().any(|s| s.id == *id)) {
            return Err(RepoError::InvalidReference("skill"));
        }
        for id in skill_ids {
            store.user_skills.insert((user_id, *id));
        }
        Ok(())
    }

    async fn remove_user_skill(&self, user_id: Uuid, skill_id: i32) -> RepoResult<()> {
        if self.store().user_skills.remove(&(user_id, skill_id)) {
            Ok(())
        } else {
            Err(RepoError::NotFound("skill"))
        }
    }
}
