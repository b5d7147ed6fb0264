use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl AppError {
    /// Stable machine-readable code, also used in non-HTTP result shapes.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Forbidden | AppError::PermissionDenied => "FORBIDDEN",
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) => "EXTERNAL_API_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden | AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to API clients; internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ExternalApiError(msg) => msg.clone(),
            AppError::JwtError(_) => "Invalid access token".to_string(),
            AppError::Forbidden => "Forbidden".to_string(),
            AppError::PermissionDenied => "Permission denied".to_string(),
            AppError::ReqwestError(_) => "External service unavailable".to_string(),
            AppError::DatabaseError(_) => "Database error".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::ValidationError(msg) => log::warn!("Validation error: {msg}"),
            AppError::AuthError(msg) => log::warn!("Authentication error: {msg}"),
            AppError::JwtError(err) => log::warn!("Token rejected: {err}"),
            AppError::Conflict(msg) => log::warn!("Conflict: {msg}"),
            AppError::Forbidden => log::warn!("Forbidden access"),
            AppError::PermissionDenied => log::warn!("Permission denied"),
            AppError::NotFound(_) => {}
            AppError::ExternalApiError(msg) => log::error!("External API error: {msg}"),
            AppError::ReqwestError(err) => log::error!("External request failed: {err}"),
            AppError::DatabaseError(err) => log::error!("Database error: {err}"),
            _ => log::error!("Internal error: {self}"),
        }

        HttpResponse::build(self.http_status()).json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": self.public_message()
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let resp = AppError::Conflict("Membership already renewed".into()).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);

        let resp = AppError::NotFound("Membership not found".into()).error_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

        let err = AppError::DatabaseError(sea_orm::DbErr::Custom("boom".into()));
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(err.public_message(), "Database error");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::ValidationError("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(AppError::PermissionDenied.code(), "FORBIDDEN");
        assert_eq!(AppError::ConfigError("x".into()).code(), "INTERNAL_ERROR");
    }
}
