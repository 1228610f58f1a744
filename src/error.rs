use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Stable, machine-readable error kinds returned as `code` in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MissingFields,
    InvalidInput,
    AlreadyMember,
    PendingInvitationExists,
    EmailAlreadyRegistered,
    InvitationNotFound,
    InvitationAlreadyAccepted,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    EmailDeliveryFailed,
    InternalError,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("This email is already registered as a member")]
    AlreadyMember,
    #[error("This email already has a pending invitation")]
    PendingInvitationExists,
    #[error("This email is already registered. Please use a different email or try logging in.")]
    EmailAlreadyRegistered,
    #[error("Invitation not found")]
    InvitationNotFound,
    #[error("Invitation has already been accepted")]
    InvitationAlreadyAccepted,
}

impl RuleViolation {
    pub fn code(&self) -> ErrorCode {
        match self {
            RuleViolation::AlreadyMember => ErrorCode::AlreadyMember,
            RuleViolation::PendingInvitationExists => ErrorCode::PendingInvitationExists,
            RuleViolation::EmailAlreadyRegistered => ErrorCode::EmailAlreadyRegistered,
            RuleViolation::InvitationNotFound => ErrorCode::InvitationNotFound,
            RuleViolation::InvitationAlreadyAccepted => ErrorCode::InvitationAlreadyAccepted,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RuleViolation::InvitationNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Database(e) if is_unique_violation(e) => ErrorCode::Conflict,
            AppError::Database(_) => ErrorCode::InternalError,
            AppError::MissingFields(_) => ErrorCode::MissingFields,
            AppError::Validation(_) => ErrorCode::InvalidInput,
            AppError::Rule(rule) => rule.code(),
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::EmailDelivery(_) => ErrorCode::EmailDeliveryFailed,
            AppError::Internal | AppError::InternalWithMsg(_) => ErrorCode::InternalError,
        }
    }

    /// Status and client-facing message. Internal details are logged, never returned.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return (StatusCode::CONFLICT, "Resource already exists (duplicate entry)".to_string());
                }
                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::MissingFields(_) | AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Rule(rule) => (rule.status(), rule.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::EmailDelivery(msg) => {
                error!("Email delivery error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email".to_string())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db_err| db_err.is_unique_violation())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
