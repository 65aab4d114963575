//! Error taxonomy for collaborator calls.

use serde_json::Value;
use thiserror::Error;

/// Failure reported by (or while reaching) the REST collaborator.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<Value>,
        code: String,
        message: String,
    },

    #[error("conflict: {message}")]
    Conflict {
        details: Vec<Value>,
        code: String,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String, code: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Create a validation error
    pub fn validation(details: Vec<Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            code: "validation_error".to_string(),
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(details: Vec<Value>, message: impl Into<String>) -> Self {
        Self::Conflict {
            details,
            code: "conflict".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            code: "unauthorized".to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            code: "forbidden".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Map an HTTP status plus the decoded error body onto a variant.
    pub fn from_status(
        status: u16,
        code: Option<String>,
        message: impl Into<String>,
        details: Vec<Value>,
    ) -> Self {
        let message = message.into();
        let with_code = |fallback: &str| code.clone().unwrap_or_else(|| fallback.to_string());

        match status {
            400 => Self::BadRequest {
                message,
                code: with_code("bad_request"),
            },
            401 => Self::Unauthorized {
                message,
                code: with_code("unauthorized"),
            },
            403 => Self::Forbidden {
                message,
                code: with_code("forbidden"),
            },
            404 => Self::NotFound {
                message,
                code: with_code("not_found"),
            },
            409 => Self::Conflict {
                details,
                code: with_code("conflict"),
                message,
            },
            422 => Self::Validation {
                details,
                code: with_code("validation_error"),
                message,
            },
            other => Self::Internal(anyhow::anyhow!(
                "collaborator returned {} ({}): {}",
                other,
                with_code("internal_error"),
                message
            )),
        }
    }

    /// Machine-readable code, matching the backend's `error.code`.
    pub fn code(&self) -> &str {
        match self {
            ApiError::Validation { code, .. }
            | ApiError::Conflict { code, .. }
            | ApiError::NotFound { code, .. }
            | ApiError::Unauthorized { code, .. }
            | ApiError::Forbidden { code, .. }
            | ApiError::BadRequest { code, .. } => code,
            ApiError::Transport(_) => "transport_error",
            ApiError::Decode(_) => "decode_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Message suitable for a banner, without the variant prefix.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Conflict { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Unauthorized { message, .. }
            | ApiError::Forbidden { message, .. }
            | ApiError::BadRequest { message, .. } => message.clone(),
            ApiError::Transport(_) => "The server could not be reached".to_string(),
            ApiError::Decode(_) | ApiError::Internal(_) => {
                "An unexpected server error occurred".to_string()
            }
        }
    }

    /// Field-level messages carried in `details` as `{"field", "error"}` pairs.
    pub fn field_errors(&self) -> Vec<(String, String)> {
        let details = match self {
            ApiError::Validation { details, .. } | ApiError::Conflict { details, .. } => details,
            _ => return Vec::new(),
        };

        details
            .iter()
            .filter_map(|detail| {
                let field = detail.get("field")?.as_str()?;
                let message = detail
                    .get("error")
                    .or_else(|| detail.get("message"))
                    .and_then(Value::as_str)?;
                Some((field.to_string(), message.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_error() {
        let details = vec![json!({"field": "name", "error": "required"})];
        let error = ApiError::validation(details.clone(), "Validation failed");

        match error {
            ApiError::Validation {
                details: d,
                code,
                message,
            } => {
                assert_eq!(d, details);
                assert_eq!(code, "validation_error");
                assert_eq!(message, "Validation failed");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_status_mapping() {
        let error = ApiError::from_status(404, None, "Category not found", vec![]);
        assert!(matches!(error, ApiError::NotFound { .. }));
        assert_eq!(error.code(), "not_found");

        let error = ApiError::from_status(
            409,
            Some("category_in_use".to_string()),
            "Category still has books",
            vec![],
        );
        assert_eq!(error.code(), "category_in_use");
        assert_eq!(error.user_message(), "Category still has books");

        let error = ApiError::from_status(503, None, "down", vec![]);
        assert!(matches!(error, ApiError::Internal(_)));
    }

    #[test]
    fn test_field_errors_from_details() {
        let error = ApiError::validation(
            vec![
                json!({"field": "email", "error": "already taken"}),
                json!({"field": "name", "message": "too short"}),
                json!({"unrelated": true}),
            ],
            "invalid user",
        );

        assert_eq!(
            error.field_errors(),
            vec![
                ("email".to_string(), "already taken".to_string()),
                ("name".to_string(), "too short".to_string()),
            ]
        );
        assert!(ApiError::not_found("x").field_errors().is_empty());
    }
}
