use regex::Regex;
use std::sync::OnceLock;

use super::ApiError;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex"))
}

const MAX_USERNAME_LEN: usize = 64;
const MAX_TITLE_LEN: usize = 256;

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if !email_regex().is_match(trimmed) {
        return Err(ApiError::validation(format!(
            "Invalid email address: '{email}'"
        )));
    }
    Ok(trimmed)
}

pub fn validate_username(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Username cannot be empty"));
    }

    if trimmed.len() > MAX_USERNAME_LEN {
        return Err(ApiError::validation(format!(
            "Username must be {MAX_USERNAME_LEN} characters or less"
        )));
    }

    if trimmed.chars().any(char::is_whitespace) || trimmed.contains('/') {
        return Err(ApiError::validation(
            "Username cannot contain whitespace or slashes",
        ));
    }

    Ok(trimmed)
}

pub fn validate_password(password: &str, min_len: usize) -> Result<&str, ApiError> {
    if password.chars().count() < min_len {
        return Err(ApiError::validation(format!(
            "Password must be at least {min_len} characters"
        )));
    }
    Ok(password)
}

pub fn validate_title(title: &str) -> Result<&str, ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Title cannot be empty"));
    }

    if trimmed.len() > MAX_TITLE_LEN {
        return Err(ApiError::validation(format!(
            "Title must be {MAX_TITLE_LEN} characters or less"
        )));
    }

    Ok(trimmed)
}

pub fn validate_not_blank<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} can't be empty")));
    }
    Ok(value)
}
