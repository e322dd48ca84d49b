//! Token verification seam for the external identity provider.
//!
//! Tokens are issued elsewhere; this service only verifies the bearer
//! token and exposes the claims the boundary needs for auditing.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppResult;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject assigned by the identity provider
    pub sub: String,
    /// Display identity used for audit stamping, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication service trait for dependency injection.
///
/// Token issuance is the identity provider's concern; the application
/// only ever verifies.
pub trait AuthService: Send + Sync {
    /// Verify a bearer token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Concrete verifier using the shared-secret verification key.
pub struct JwtAuthenticator {
    config: Config,
}

impl JwtAuthenticator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl AuthService for JwtAuthenticator {
    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn issue(claims: &Claims, config: &Config) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(config.jwt_secret_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verifies_a_token_signed_with_the_shared_secret() {
        let config = Config::from_env();
        let verifier = JwtAuthenticator::new(config.clone());
        let now = Utc::now().timestamp();
        let token = issue(
            &Claims {
                sub: "subject-1".to_string(),
                preferred_username: Some("alice".to_string()),
                exp: now + 3600,
                iat: now,
            },
            &config,
        );

        let claims = verifier.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "subject-1");
        assert_eq!(claims.preferred_username.as_deref(), Some("alice"));
    }

    #[test]
    fn rejects_an_expired_token() {
        let config = Config::from_env();
        let verifier = JwtAuthenticator::new(config.clone());
        let now = Utc::now().timestamp();
        let token = issue(
            &Claims {
                sub: "subject-1".to_string(),
                preferred_username: None,
                exp: now - 3600,
                iat: now - 7200,
            },
            &config,
        );

        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let verifier = JwtAuthenticator::new(Config::from_env());
        assert!(verifier.verify_token("not-a-token").is_err());
    }
}
