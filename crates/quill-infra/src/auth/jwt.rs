//! JWT bearer token verification.
//!
//! Access tokens are minted by the identity provider and signed (HS256) with
//! the project's shared JWT secret. This service only checks them.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use quill_core::ports::{AuthError, TokenClaims, TokenVerifier};

const DEV_SECRET: &str = "change-me-in-production";

/// JWT verifier configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Expected `aud` claim; `None` disables the audience check.
    pub audience: Option<String>,
    /// Expected `iss` claim; `None` disables the issuer check.
    pub issuer: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            audience: Some("authenticated".to_string()),
            issuer: None,
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEV_SECRET.to_string());

        // Warn if using default secret in production
        if secret == DEV_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        Self {
            secret,
            audience: match std::env::var("JWT_AUDIENCE") {
                Ok(aud) if aud.is_empty() => None,
                Ok(aud) => Some(aud),
                Err(_) => Some("authenticated".to_string()),
            },
            issuer: std::env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty()),
        }
    }
}

/// Wire form of the provider's access-token claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    exp: i64,
    iat: i64,
}

/// HS256 JWT verifier.
pub struct JwtTokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        match &config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        if let Some(iss) = &config.issuer {
            validation.set_issuer(&[iss]);
        }

        Self {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::from_env())
    }

    /// Mint a token the way the identity provider would. Used by local tooling and tests.
    pub fn issue(
        &self,
        subject: &str,
        email: Option<&str>,
        ttl: TimeDelta,
    ) -> Result<String, AuthError> {
        let now = Utc::now();

        let claims = Claims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            role: Some("authenticated".to_string()),
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("missing subject".to_string()));
        }

        Ok(TokenClaims {
            subject: claims.sub,
            email: claims.email,
            role: claims.role,
            exp: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            audience: Some("authenticated".to_string()),
            issuer: None,
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let verifier = JwtTokenVerifier::new(test_config());

        let token = verifier
            .issue("user-123", Some("admin@example.com"), TimeDelta::hours(1))
            .unwrap();
        let claims = verifier.verify(&token).unwrap();

        assert_eq!(claims.subject, "user-123");
        assert_eq!(claims.email.as_deref(), Some("admin@example.com"));
        assert_eq!(claims.role.as_deref(), Some("authenticated"));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let verifier = JwtTokenVerifier::new(test_config());

        let result = verifier.verify("invalid-token");

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let verifier = JwtTokenVerifier::new(test_config());

        // Past the default 60s leeway.
        let token = verifier
            .issue("user-123", None, TimeDelta::minutes(-10))
            .unwrap();

        assert!(matches!(verifier.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let ours = JwtTokenVerifier::new(test_config());
        let theirs = JwtTokenVerifier::new(JwtConfig {
            secret: "someone-else".to_string(),
            ..test_config()
        });

        let token = theirs.issue("user-123", None, TimeDelta::hours(1)).unwrap();

        assert!(ours.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let verifier = JwtTokenVerifier::new(test_config());
        let anon = JwtTokenVerifier::new(JwtConfig {
            audience: Some("anon".to_string()),
            ..test_config()
        });

        let token = anon.issue("user-123", None, TimeDelta::hours(1)).unwrap();

        assert!(verifier.verify(&token).is_err());
    }
}
