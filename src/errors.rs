use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

/// A customer candidate was rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The field was absent, null or empty after trimming.
    Missing(&'static str),
    /// The field was present but could not be coerced to its type.
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ValidationError {
    /// Name of the offending field, as it appears in JSON bodies.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(field) => field,
            ValidationError::Invalid { field, .. } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Missing(field) => write!(f, "{} is required", field),
            ValidationError::Invalid { field, reason } => {
                write!(f, "{} is invalid: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Record identifier is empty or not a UUID.
    InvalidIdentifier(String),
    /// Candidate record failed field validation.
    Validation(ValidationError),
    /// Request body could not be read as JSON.
    BadRequest(String),
    /// Another record already holds this member number.
    UniquenessConflict(i64),
    /// Resource not found error.
    NotFound(String),
    /// Query-level database failure.
    DatabaseError(sqlx::Error),
    /// The connection attempt failed; shared by every caller that awaited it.
    ConnectionError(Arc<sqlx::Error>),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidIdentifier(_) | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::UniquenessConflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::ConnectionError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::WithContext { source, .. } => source.status(),
        }
    }

    /// Strips any context wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidIdentifier(id) => write!(f, "Invalid id: {:?}", id),
            AppError::Validation(e) => write!(f, "Validation failed: {}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::UniquenessConflict(n) => {
                write!(f, "Member number {} is already taken", n)
            }
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::ConnectionError(e) => write!(f, "Database connection failed: {}", e),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Client errors carry their message; storage failures are logged here and
    /// reported with a generic body so nothing internal leaks to the caller.
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::InvalidIdentifier(_) => json!({ "error": "Invalid id" }),
            AppError::Validation(e) => json!({
                "error": e.to_string(),
                "field": e.field(),
            }),
            AppError::BadRequest(msg) => json!({ "error": msg }),
            AppError::UniquenessConflict(n) => json!({
                "error": format!("memberNumber {} is already in use", n),
                "field": "memberNumber",
            }),
            AppError::NotFound(_) => json!({ "error": "Not found" }),
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                json!({ "error": "Internal Server Error" })
            }
            AppError::ConnectionError(e) => {
                tracing::error!("Database connection error: {:?}", e);
                json!({ "error": "Internal Server Error" })
            }
            AppError::WithContext { source, context } => {
                // Log full context chain, then answer as the root cause would
                if status.is_server_error() {
                    tracing::error!("Error with context: {} -> {}", context, source);
                } else {
                    tracing::debug!("Error with context: {} -> {}", context, source);
                }
                return (*source).into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    /// Converts a `sqlx::Error` into an `AppError`.
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

/// Extension for sqlx::Error to add context
impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidIdentifier(String::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Validation(ValidationError::Missing("name")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::UniquenessConflict(7).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_context_keeps_root_status() {
        let wrapped: Result<(), AppError> =
            Err(sqlx::Error::PoolTimedOut).context("loading customer");
        let err = wrapped.unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err.root(), AppError::DatabaseError(_)));
        assert!(err.to_string().starts_with("loading customer: "));
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = ValidationError::Invalid {
            field: "memberNumber",
            reason: "must be at least 1".into(),
        };
        assert_eq!(err.field(), "memberNumber");
        assert_eq!(err.to_string(), "memberNumber is invalid: must be at least 1");
    }
}
