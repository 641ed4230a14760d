use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use storage::services::lifecycle::LifecycleError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::NotFound => write!(f, "Resource not found"),
            Self::InternalServerError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl WebError {
    /// Status code and the stable classification clients branch on.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Storage(StorageError::Lifecycle(LifecycleError::InvalidState(_))) => {
                (StatusCode::CONFLICT, "invalid_state")
            }
            Self::Storage(StorageError::Lifecycle(LifecycleError::NotPermitted(_))) => {
                (StatusCode::FORBIDDEN, "not_permitted")
            }
            Self::Storage(StorageError::NotFound) => (StatusCode::NOT_FOUND, "not_found"),
            Self::Storage(StorageError::ConstraintViolation(_)) => {
                (StatusCode::CONFLICT, "conflict")
            }
            Self::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            Self::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            Self::InternalServerError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, kind) = self.classify();

        let body = match &self {
            Self::Storage(StorageError::Lifecycle(e)) => {
                tracing::debug!("Lifecycle rejection: {}", e);
                json!({
                    "error": e.to_string(),
                    "kind": kind
                })
            }
            Self::Storage(StorageError::NotFound) | Self::NotFound => {
                json!({
                    "error": "Resource not found",
                    "kind": kind
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg)) => {
                json!({
                    "error": msg,
                    "kind": kind
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred",
                    "kind": kind
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "kind": kind,
                    "details": field_errors
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized",
                    "kind": kind
                })
            }
            Self::Forbidden => {
                json!({
                    "error": "Administrator role required",
                    "kind": kind
                })
            }
            Self::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                json!({
                    "error": "An internal error occurred",
                    "kind": kind
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<LifecycleError> for WebError {
    fn from(error: LifecycleError) -> Self {
        Self::Storage(StorageError::Lifecycle(error))
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_errors_keep_their_classification() {
        let invalid = WebError::from(LifecycleError::InvalidState("double start".into()));
        assert_eq!(invalid.classify(), (StatusCode::CONFLICT, "invalid_state"));

        let not_permitted = WebError::from(LifecycleError::NotPermitted("closed".into()));
        assert_eq!(
            not_permitted.classify(),
            (StatusCode::FORBIDDEN, "not_permitted")
        );
    }

    #[test]
    fn test_access_errors() {
        assert_eq!(
            WebError::Forbidden.classify(),
            (StatusCode::FORBIDDEN, "forbidden")
        );
        assert_eq!(
            WebError::Unauthorized.classify(),
            (StatusCode::UNAUTHORIZED, "unauthorized")
        );
        assert_eq!(
            WebError::from(StorageError::NotFound).classify(),
            (StatusCode::NOT_FOUND, "not_found")
        );
        assert_eq!(
            WebError::NotFound.classify(),
            (StatusCode::NOT_FOUND, "not_found")
        );
        assert_eq!(
            WebError::from(StorageError::ConstraintViolation("Username already taken".into()))
                .classify(),
            (StatusCode::CONFLICT, "conflict")
        );
    }

    #[test]
    fn test_response_status_matches_classification() {
        let response = WebError::from(LifecycleError::InvalidState("x".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = WebError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_internal_errors_are_masked() {
        let error = WebError::InternalServerError("worker panicked".into());
        assert_eq!(
            error.classify(),
            (StatusCode::INTERNAL_SERVER_ERROR, "internal")
        );

        let body = axum::body::to_bytes(error.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["kind"], "internal");
        assert!(!body["error"].as_str().unwrap().contains("worker panicked"));
    }
}
