//! Decoding of collaborator error responses

use reqwest::StatusCode;
use senselib_kernel::ApiError;
use serde::Deserialize;

/// Error body inside the `{"error": {...}}` envelope
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
    pub message: String,
    pub code: String,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Map a non-success response onto [`ApiError`]
pub fn decode_error(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => {
            tracing::warn!(
                status_code = %status.as_u16(),
                error_code = %error.code,
                trace_id = error.trace_id.as_deref().unwrap_or("-"),
                "collaborator error"
            );
            ApiError::from_status(
                status.as_u16(),
                Some(error.code),
                error.message,
                error.details,
            )
        }
        Err(_) => {
            let message = match body.trim() {
                "" => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                text => text.to_string(),
            };
            tracing::warn!(status_code = %status.as_u16(), "collaborator error without envelope");
            ApiError::from_status(status.as_u16(), None, message, Vec::new())
        }
    }
}

/// Map a reqwest failure onto [`ApiError`]
pub fn transport(error: reqwest::Error) -> ApiError {
    if error.is_decode() {
        ApiError::decode(error.to_string())
    } else {
        ApiError::transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_is_decoded() {
        let body = json!({
            "error": {
                "code": "validation_error",
                "message": "Validation failed",
                "details": [{"field": "name", "error": "required"}],
                "trace_id": "0190a0b2-0000-7000-8000-000000000000",
                "timestamp": "2024-01-01T00:00:00Z"
            }
        })
        .to_string();

        let error = decode_error(StatusCode::UNPROCESSABLE_ENTITY, &body);
        assert!(matches!(error, ApiError::Validation { .. }));
        assert_eq!(
            error.field_errors(),
            vec![("name".to_string(), "required".to_string())]
        );
    }

    #[test]
    fn test_plain_body_falls_back_to_text() {
        let error = decode_error(StatusCode::NOT_FOUND, "no such category");
        assert!(matches!(error, ApiError::NotFound { .. }));
        assert_eq!(error.user_message(), "no such category");
    }

    #[test]
    fn test_empty_body_uses_reason_phrase() {
        let error = decode_error(StatusCode::FORBIDDEN, "");
        assert_eq!(error.user_message(), "Forbidden");
    }
}
