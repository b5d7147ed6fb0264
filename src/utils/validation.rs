use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn tenant_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]{2,62}$").expect("valid tenant id regex"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

/// 租户 ID：小写字母、数字和连字符，3-63 位
pub fn validate_tenant_id(id: &str) -> AppResult<()> {
    if !tenant_id_regex().is_match(id) {
        return Err(AppError::ValidationError(
            "Tenant id must be 3-63 lowercase letters, digits or dashes".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !email_regex().is_match(email) {
        return Err(AppError::ValidationError(format!("Invalid email {email}")));
    }
    Ok(())
}

pub fn require_non_empty(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} must not be empty")));
    }
    Ok(())
}
