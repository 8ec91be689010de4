use lazy_static::lazy_static;
use regex::Regex;
use time::Date;

/// Request bodies check (and normalise) themselves before reaching a repository.
pub trait Validate {
    fn validate(&mut self) -> Result<(), String>;
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &mut String) -> Result<(), String> {
    *email = email.trim().to_lowercase();
    if is_valid_email(email) {
        Ok(())
    } else {
        Err("invalid email".into())
    }
}

pub fn required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

pub fn min_len(field: &str, value: &str, min: usize) -> Result<(), String> {
    if value.trim().chars().count() < min {
        return Err(format!("{field} must be at least {min} characters long"));
    }
    Ok(())
}

pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be one of: {}", allowed.join(", ")))
    }
}

/// A running entry has no end; a finished one cannot end before it starts.
pub fn date_range(
    start: Option<Date>,
    end: Option<Date>,
    running: bool,
    running_flag: &str,
) -> Result<(), String> {
    if running && end.is_some() {
        return Err(format!("end_date must be empty when {running_flag} is set"));
    }
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err("start_date must not be after end_date".into());
        }
    }
    Ok(())
}

/// Trims an optional free-text field, turning blank input into `None`.
pub fn trim_opt(value: &mut Option<String>) {
    if let Some(v) = value.take() {
        let trimmed = v.trim();
        if !trimmed.is_empty() {
            *value = Some(trimmed.to_string());
        }
    }
}
