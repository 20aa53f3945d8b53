use quill_shared::ErrorResponse;

/// Client errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (connection, TLS, decoding).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// Build an [`ClientError::Api`] from a failure response body.
    ///
    /// Falls back to the raw body when it is not the JSON failure envelope.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(envelope) => envelope.describe().to_string(),
            Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
            Err(_) => body.trim().to_string(),
        };

        ClientError::Api { status, message }
    }

    /// Whether the server reported the requested entity as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status: 404, .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_envelope_uses_message() {
        let err = ClientError::from_response(404, r#"{"status":"error","message":"Post 3 not found"}"#);

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "API error (404): Post 3 not found");
    }

    #[test]
    fn test_failure_envelope_uses_status() {
        let err = ClientError::from_response(401, r#"{"status":"Unauthorized"}"#);

        assert!(err.is_unauthorized());
        match err {
            ClientError::Api { message, .. } => assert_eq!(message, "Unauthorized"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body_is_kept() {
        let err = ClientError::from_response(502, "Bad Gateway\n");

        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
