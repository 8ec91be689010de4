use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::dto::SignupRequest;
use crate::db::models::{Company, User};
use crate::validate::{min_len, Validate};

pub const COMPANY_FIELD_MIN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminRequest {
    #[serde(flatten)]
    pub account: SignupRequest,
    pub admin_level: i32,
}

impl Validate for CreateAdminRequest {
    fn validate(&mut self) -> Result<(), String> {
        self.account.validate()?;
        if !(1..=5).contains(&self.admin_level) {
            return Err("admin_level must be between 1 and 5".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecruiterRequest {
    #[serde(flatten)]
    pub account: SignupRequest,
    pub company_id: Option<Uuid>,
}

impl Validate for CreateRecruiterRequest {
    fn validate(&mut self) -> Result<(), String> {
        self.account.validate()?;
        if self.company_id.is_none() {
            return Err("company_id is required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub description: String,
}

impl Validate for CreateCompanyRequest {
    fn validate(&mut self) -> Result<(), String> {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        min_len("name", &self.name, COMPANY_FIELD_MIN)?;
        min_len("description", &self.description, COMPANY_FIELD_MIN)
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Validate for UpdateCompanyRequest {
    fn validate(&mut self) -> Result<(), String> {
        if self.name.is_none() && self.description.is_none() {
            return Err("at least one of name or description must be provided".into());
        }
        if let Some(name) = self.name.as_mut() {
            *name = name.trim().to_string();
            min_len("name", name, COMPANY_FIELD_MIN)?;
        }
        if let Some(description) = self.description.as_mut() {
            *description = description.trim().to_string();
            min_len("description", description, COMPANY_FIELD_MIN)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub message: String,
    pub company: Company,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
