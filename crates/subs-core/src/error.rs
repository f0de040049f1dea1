//! Unified error handling for Subs Tracker
//!
//! This module provides a single error type covering every failure the
//! subscription core can surface, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Wire name of the offending field (e.g. `start_date`)
    pub field: String,
    /// Human readable reason
    pub description: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, format!("{} is required", field))
    }

    pub fn month_year(field: &str) -> Self {
        Self::new(field, format!("{} must match 'MM-YYYY'", field))
    }

    pub fn uuid(field: &str) -> Self {
        Self::new(field, format!("{} should be uuid", field))
    }
}

/// Main application error type
///
/// Every failure in the application is converted to this type. The kind is
/// never erased on the way up, so the HTTP layer can pick a status from it.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Storage Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Storage call timed out after {0} ms")]
    Timeout(u64),

    // ==================== Domain Errors ====================
    #[error("subscription not found: {0}")]
    SubscriptionNotFound(i32),

    #[error("user already has subscription to this service")]
    DuplicateSubscription {
        user_id: String,
        service_name: String,
    },

    // ==================== Validation Errors ====================
    #[error("validation error")]
    Validation(Vec<FieldError>),

    #[error("bad request: {0}")]
    BadRequest(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::SubscriptionNotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::DuplicateSubscription { .. } => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Timeout(_) => "timeout",
            AppError::SubscriptionNotFound(_) => "subscription_not_found",
            AppError::DuplicateSubscription { .. } => "duplicate_subscription",
            AppError::Validation(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Message safe to show to API clients
    ///
    /// Server-side failures are reduced to a generic text; the full error is
    /// only logged.
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "internal server error".to_string(),
            StatusCode::BAD_REQUEST => "bad request".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::SubscriptionNotFound(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, AppError::DuplicateSubscription { .. })
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut body = json!({
            "error": self.public_message(),
            "code": self.error_code(),
        });

        if let AppError::Validation(fields) = self {
            body["fields"] = json!(fields);
        }

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(field_errors_from(&err))
    }
}

/// Flatten `validator` output into wire field errors, sorted by field name
pub fn field_errors_from(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| {
                let description = match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, e.code),
                };
                FieldError::new(field.clone(), description)
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::Validation(vec![]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::SubscriptionNotFound(999).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DuplicateSubscription {
                user_id: "11111111-1111-1111-1111-111111111111".to_string(),
                service_name: "Netflix".to_string(),
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Timeout(30_000).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Timeout(1).error_code(), "timeout");
        assert_eq!(
            AppError::SubscriptionNotFound(1).error_code(),
            "subscription_not_found"
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Database("relation \"subscriptions\" does not exist".to_string());
        assert_eq!(err.public_message(), "internal server error");

        let err = AppError::SubscriptionNotFound(7);
        assert_eq!(err.public_message(), "subscription not found: 7");
    }

    #[actix_web::test]
    async fn test_validation_response_lists_fields() {
        let err = AppError::Validation(vec![
            FieldError::required("service_name"),
            FieldError::month_year("start_date"),
        ]);

        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "validation error");
        assert_eq!(body["fields"][0]["field"], "service_name");
        assert_eq!(body["fields"][1]["description"], "start_date must match 'MM-YYYY'");
    }
}
