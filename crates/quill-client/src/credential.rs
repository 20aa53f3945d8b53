use std::fmt;
use std::sync::Arc;

/// Bearer token issued by the identity provider.
///
/// Cheap to clone. `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential {
    token: Arc<str>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").field("token", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("secret.jwt.value");

        assert_eq!(credential.header_value(), "Bearer secret.jwt.value");
        assert!(!format!("{credential:?}").contains("secret"));
    }
}
