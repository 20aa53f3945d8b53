//! JSON response envelopes.
//!
//! Success: `{"status": "OK", <payload fields>, "message"?: ...}`.
//! Failure: `{"status": <message>}`, or `{"status": "error", "message": ...}` for missing entities.

use serde::{Deserialize, Serialize};

/// Status value carried by every successful response.
pub const STATUS_OK: &str = "OK";

/// Standard successful API response wrapper; `data` fields are inlined next to `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(flatten)]
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            data,
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            data,
            message: Some(message.into()),
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The failure message itself, or `"error"` when `message` carries it.
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Generic failure carrying the underlying message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: message.into(),
            message: None,
        }
    }

    /// Distinct "not found" signal for single-item reads.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn unauthorized() -> Self {
        Self::failure("Unauthorized")
    }

    pub fn internal_error() -> Self {
        Self::failure("Internal Server Error")
    }

    /// Human-readable description, whichever field holds it.
    pub fn describe(&self) -> &str {
        self.message.as_deref().unwrap_or(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::CreatedResource;
    use serde_json::json;

    #[test]
    fn test_success_envelope_inlines_payload() {
        let body = ApiResponse::ok_with_message(CreatedResource { id: 10 }, "Post created");

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"status": "OK", "id": 10, "message": "Post created"})
        );
    }

    #[test]
    fn test_failure_envelopes() {
        assert_eq!(
            serde_json::to_value(ErrorResponse::failure("boom")).unwrap(),
            json!({"status": "boom"})
        );
        assert_eq!(
            serde_json::to_value(ErrorResponse::not_found("Post 3 not found")).unwrap(),
            json!({"status": "error", "message": "Post 3 not found"})
        );
        assert_eq!(ErrorResponse::not_found("gone").describe(), "gone");
    }
}
