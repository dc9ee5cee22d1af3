//! Error handling for the TreeMatch backend
//!
//! Every error is classified so callers can tell "ask the user for manual
//! input" apart from "transient failure, may retry".

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::EngineError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Location errors
    #[error("Location unavailable: cache, GPS and IP geolocation all failed")]
    LocationUnavailable,

    #[error("Region or agro-ecological zone could not be resolved")]
    ZoneUnresolved,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("Weather service unavailable")]
    WeatherServiceUnavailable,

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Coarse classification of an error for callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The user must enter a location by hand
    NeedsManualInput,
    /// Network or collaborator failure; retrying may succeed
    Transient,
    /// The request itself is wrong
    InvalidInput,
    NotFound,
    Fatal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::LocationUnavailable | AppError::ZoneUnresolved => ErrorKind::NeedsManualInput,
            AppError::WeatherServiceUnavailable
            | AppError::ExternalService(_)
            | AppError::Timeout(_)
            | AppError::DatabaseError(_) => ErrorKind::Transient,
            AppError::InvalidCoordinates(_)
            | AppError::Validation { .. }
            | AppError::ValidationError(_) => ErrorKind::InvalidInput,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Configuration(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                ErrorKind::Fatal
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Build a field-level validation error
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidLatitude(_) | EngineError::InvalidLongitude(_) => {
                AppError::InvalidCoordinates(err.to_string())
            }
            EngineError::InvalidMinScore(_) => AppError::validation("min_score", err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub kind: ErrorKind,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::LocationUnavailable => (StatusCode::UNPROCESSABLE_ENTITY, "LOCATION_UNAVAILABLE"),
            AppError::ZoneUnresolved => (StatusCode::UNPROCESSABLE_ENTITY, "ZONE_UNRESOLVED"),
            AppError::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            AppError::Validation { .. } | AppError::ValidationError(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::WeatherServiceUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "WEATHER_SERVICE_UNAVAILABLE")
            }
            AppError::ExternalService(_) => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            AppError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Internal(_) | AppError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::NotFound(resource) => format!("{} not found", resource),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::InternalError(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        let field = match &self {
            AppError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };

        let detail = ErrorDetail {
            code: code.to_string(),
            message,
            kind: self.kind(),
            retryable: self.is_retryable(),
            field,
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_is_classified() {
        let cases = vec![
            (AppError::LocationUnavailable, ErrorKind::NeedsManualInput, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::ZoneUnresolved, ErrorKind::NeedsManualInput, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::InvalidCoordinates("91".into()), ErrorKind::InvalidInput, StatusCode::BAD_REQUEST),
            (AppError::validation("min_score", "too high"), ErrorKind::InvalidInput, StatusCode::BAD_REQUEST),
            (AppError::ValidationError("bad".into()), ErrorKind::InvalidInput, StatusCode::BAD_REQUEST),
            (AppError::NotFound("Species".into()), ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (AppError::WeatherServiceUnavailable, ErrorKind::Transient, StatusCode::SERVICE_UNAVAILABLE),
            (AppError::ExternalService("down".into()), ErrorKind::Transient, StatusCode::BAD_GATEWAY),
            (AppError::Timeout("Weather API".into()), ErrorKind::Transient, StatusCode::GATEWAY_TIMEOUT),
            (AppError::DatabaseError(sqlx::Error::PoolTimedOut), ErrorKind::Transient, StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Configuration("bad".into()), ErrorKind::Fatal, StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal("oops".into()), ErrorKind::Fatal, StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::InternalError(anyhow::anyhow!("oops")), ErrorKind::Fatal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, kind, status) in cases {
            assert_eq!(error.kind(), kind, "{:?}", error);
            assert_eq!(error.is_retryable(), kind == ErrorKind::Transient, "{:?}", error);
            assert_eq!(error.status_and_code().0, status, "{:?}", error);
        }
    }

    #[test]
    fn location_unavailable_code() {
        assert_eq!(
            AppError::LocationUnavailable.status_and_code().1,
            "LOCATION_UNAVAILABLE"
        );
    }

    #[test]
    fn engine_errors_map_to_input_errors() {
        let err: AppError = shared::EngineError::InvalidMinScore(150).into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "min_score"));
    }
}
