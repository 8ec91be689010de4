use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Applicant,
    Recruiter,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applicant" => Ok(Role::Applicant),
            "recruiter" => Ok(Role::Recruiter),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// User record in the database.
#[derive(Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub location: Option<String>,
    pub title: Option<String>,
    pub about_section: Option<String>,
    pub profile_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

// Hand-written so the password hash never reaches a log line.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Base user row to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
}

/// Role-specific row written in the same transaction as the base user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleExtension {
    Applicant,
    Admin { admin_level: i32 },
    Recruiter { company_id: Option<Uuid> },
}

impl RoleExtension {
    pub fn role(&self) -> Role {
        match self {
            RoleExtension::Applicant => Role::Applicant,
            RoleExtension::Admin { .. } => Role::Admin,
            RoleExtension::Recruiter { .. } => Role::Recruiter,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PhoneNumber {
    pub id: Uuid,
    pub user_id: Uuid,
    pub phone_number: String,
    pub phone_type: String,
    pub is_primary: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Education {
    pub id: Uuid,
    pub user_id: Uuid,
    pub institution_name: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_current: bool,
    pub grade_gpa: Option<String>,
    pub description: Option<String>,
    #[sqlx(skip)]
    pub media: Vec<Media>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Experience {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub position_title: String,
    pub employment_type: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_current: bool,
    pub location: Option<String>,
    pub description: Option<String>,
    #[sqlx(skip)]
    pub media: Vec<Media>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub certification_name: String,
    pub issuing_organization: String,
    pub issue_date: Option<Date>,
    pub expiration_date: Option<Date>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub description: Option<String>,
    #[sqlx(skip)]
    pub media: Vec<Media>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_name: String,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_ongoing: bool,
    pub project_url: Option<String>,
    #[sqlx(skip)]
    pub media: Vec<Media>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// File metadata attached to at most one profile entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Media {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_type: String,
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub alt_text: Option<String>,
    pub description: Option<String>,
    pub education_id: Option<Uuid>,
    pub experience_id: Option<Uuid>,
    pub certification_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The profile entry a media row hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaOwner {
    Education(Uuid),
    Experience(Uuid),
    Certification(Uuid),
    Project(Uuid),
}

impl MediaOwner {
    pub fn id(&self) -> Uuid {
        match *self {
            MediaOwner::Education(id)
            | MediaOwner::Experience(id)
            | MediaOwner::Certification(id)
            | MediaOwner::Project(id) => id,
        }
    }

    /// Mirrors the `WHERE <owner>_id = $1` filter used by the Postgres media query.
    #[cfg(test)]
    pub fn owns(&self, media: &Media) -> bool {
        let fk = match self {
            MediaOwner::Education(_) => media.education_id,
            MediaOwner::Experience(_) => media.experience_id,
            MediaOwner::Certification(_) => media.certification_id,
            MediaOwner::Project(_) => media.project_id,
        };
        fk == Some(self.id())
    }
}

/// Profile entries that carry attached media.
pub trait HasMedia {
    fn media_owner(&self) -> MediaOwner;
    fn set_media(&mut self, media: Vec<Media>);
}

macro_rules! has_media {
    ($ty:ty, $variant:ident) => {
        impl HasMedia for $ty {
            fn media_owner(&self) -> MediaOwner {
                MediaOwner::$variant(self.id)
            }

            fn set_media(&mut self, media: Vec<Media>) {
                self.media = media;
            }
        }
    };
}

has_media!(Education, Education);
has_media!(Experience, Experience);
has_media!(Certification, Certification);
has_media!(Project, Project);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: i32,
    pub name: String,
}

/// Read-time composite of a user and every profile collection.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub phone_numbers: Vec<PhoneNumber>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub certifications: Vec<Certification>,
    pub projects: Vec<Project>,
    pub skills: Vec<Skill>,
}
