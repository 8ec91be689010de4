use serde::{Deserialize, Serialize};

use crate::db::models::User;
use crate::validate::{min_len, normalize_email, Validate};

pub const PASSWORD_MIN: usize = 6;
pub const FULL_NAME_MIN: usize = 6;

/// Account fields shared by applicant signup and admin-driven account creation.
#[derive(Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Validate for SignupRequest {
    fn validate(&mut self) -> Result<(), String> {
        normalize_email(&mut self.email)?;
        if self.password.chars().count() < PASSWORD_MIN {
            return Err(format!("password must be at least {PASSWORD_MIN} characters long"));
        }
        self.full_name = self.full_name.trim().to_string();
        min_len("full_name", &self.full_name, FULL_NAME_MIN)
    }
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&mut self) -> Result<(), String> {
        normalize_email(&mut self.email)?;
        if self.password.is_empty() {
            return Err("password is required".into());
        }
        Ok(())
    }
}

/// Response returned after login or signup.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
