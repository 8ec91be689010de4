use serde::Deserialize;
use time::Date;

use crate::validate::{date_range, one_of, required, trim_opt, Validate};

pub const PHONE_TYPES: &[&str] = &["mobile", "home", "work", "other"];

pub const EMPLOYMENT_TYPES: &[&str] = &[
    "full-time",
    "part-time",
    "contract",
    "internship",
    "freelance",
    "volunteer",
];

/// Body of both create and full-replace update of a phone number.
#[derive(Debug, Clone, Deserialize)]
pub struct PhoneNumberRequest {
    pub phone_number: String,
    pub phone_type: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl Validate for PhoneNumberRequest {
    fn validate(&mut self) -> Result<(), String> {
        self.phone_number = self.phone_number.trim().to_string();
        required("phone_number", &self.phone_number)?;
        self.phone_type = self.phone_type.trim().to_lowercase();
        one_of("phone_type", &self.phone_type, PHONE_TYPES)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EducationRequest {
    pub institution_name: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[serde(default)]
    pub is_current: bool,
    pub grade_gpa: Option<String>,
    pub description: Option<String>,
}

impl Validate for EducationRequest {
    fn validate(&mut self) -> Result<(), String> {
        self.institution_name = self.institution_name.trim().to_string();
        self.degree = self.degree.trim().to_string();
        required("institution_name", &self.institution_name)?;
        required("degree", &self.degree)?;
        trim_opt(&mut self.field_of_study);
        trim_opt(&mut self.grade_gpa);
        trim_opt(&mut self.description);
        date_range(self.start_date, self.end_date, self.is_current, "is_current")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceRequest {
    pub company_name: String,
    pub position_title: String,
    pub employment_type: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[serde(default)]
    pub is_current: bool,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl Validate for ExperienceRequest {
    fn validate(&mut self) -> Result<(), String> {
        self.company_name = self.company_name.trim().to_string();
        self.position_title = self.position_title.trim().to_string();
        required("company_name", &self.company_name)?;
        required("position_title", &self.position_title)?;
        self.employment_type = self.employment_type.trim().to_lowercase();
        one_of("employment_type", &self.employment_type, EMPLOYMENT_TYPES)?;
        trim_opt(&mut self.location);
        trim_opt(&mut self.description);
        date_range(self.start_date, self.end_date, self.is_current, "is_current")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CertificationRequest {
    pub certification_name: String,
    pub issuing_organization: String,
    pub issue_date: Option<Date>,
    pub expiration_date: Option<Date>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub description: Option<String>,
}

impl Validate for CertificationRequest {
    fn validate(&mut self) -> Result<(), String> {
        self.certification_name = self.certification_name.trim().to_string();
        self.issuing_organization = self.issuing_organization.trim().to_string();
        required("certification_name", &self.certification_name)?;
        required("issuing_organization", &self.issuing_organization)?;
        trim_opt(&mut self.credential_id);
        trim_opt(&mut self.credential_url);
        trim_opt(&mut self.description);
        if let (Some(issued), Some(expires)) = (self.issue_date, self.expiration_date) {
            if issued > expires {
                return Err("issue_date must not be after expiration_date".into());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRequest {
    pub project_name: String,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    #[serde(default)]
    pub is_ongoing: bool,
    pub project_url: Option<String>,
}

impl Validate for ProjectRequest {
    fn validate(&mut self) -> Result<(), String> {
        self.project_name = self.project_name.trim().to_string();
        required("project_name", &self.project_name)?;
        trim_opt(&mut self.description);
        trim_opt(&mut self.project_url);
        date_range(self.start_date, self.end_date, self.is_ongoing, "is_ongoing")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddSkillsRequest {
    pub skill_ids: Vec<i32>,
}

impl Validate for AddSkillsRequest {
    fn validate(&mut self) -> Result<(), String> {
        if self.skill_ids.is_empty() {
            return Err("skill_ids must contain at least one id".into());
        }
        self.skill_ids.sort_unstable();
        self.skill_ids.dedup();
        Ok(())
    }
}
