use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Error type for token operations.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token is invalid: {0}")]
    Invalid(String),
}

/// Claims embedded in every issued bearer token.
///
/// The claim set is deterministic: subject id, username, email, and a
/// snapshot of the user's role names at issuance time. Roles are not
/// re-checked live while the token remains valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user identifier)
    pub sub: String,
    pub username: String,
    pub email: String,
    /// Role names held by the subject when the token was issued
    pub roles: Vec<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Check whether the claims grant the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// A freshly issued token together with its expiry instant.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates signed bearer tokens.
///
/// Uses HS256 over a process-lifetime secret configured at startup. Tokens
/// carry a fixed time-to-live; validity is purely signature + expiry based,
/// there is no revocation mechanism.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create a new token issuer.
    ///
    /// # Arguments
    /// * `secret` - Signing secret, at least 256 bits for HS256; store it in
    ///   environment variables or a vault, never in code
    /// * `ttl_hours` - Fixed token lifetime in hours
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for the given principal.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(
        &self,
        subject: &str,
        username: &str,
        email: &str,
        roles: Vec<String>,
    ) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = AccessClaims {
            sub: subject.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            roles,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `Expired` - Current time is past the token's expiry
    /// * `Invalid` - Signature mismatch or malformed token
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let validation = Validation::new(self.algorithm);

        let token_data =
            decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"my_secret_key_at_least_32_bytes_long!", 24)
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = issuer();

        let issued = issuer
            .issue(
                "user123",
                "alice",
                "alice@example.com",
                vec!["USER".to_string()],
            )
            .expect("Failed to issue token");
        assert!(!issued.token.is_empty());

        let claims = issuer
            .validate(&issued.token)
            .expect("Failed to validate token");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.has_role("USER"));
        assert!(!claims.has_role("ADMIN"));
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert_eq!(issued.expires_at.timestamp(), claims.exp);
    }

    #[test]
    fn test_validate_malformed_token() {
        let result = issuer().validate("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let issuer1 = TokenIssuer::new(b"secret1_at_least_32_bytes_long_key!", 24);
        let issuer2 = TokenIssuer::new(b"secret2_at_least_32_bytes_long_key!", 24);

        let issued = issuer1
            .issue("user123", "alice", "alice@example.com", vec![])
            .expect("Failed to issue token");

        let result = issuer2.validate(&issued.token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        // Negative TTL makes the token expired at issuance. jsonwebtoken
        // applies default leeway, so push expiry well into the past.
        let issuer = TokenIssuer::new(b"my_secret_key_at_least_32_bytes_long!", -2);

        let issued = issuer
            .issue("user123", "alice", "alice@example.com", vec![])
            .expect("Failed to issue token");

        let result = issuer.validate(&issued.token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_roles_snapshot_round_trips() {
        let issuer = issuer();
        let roles = vec!["USER".to_string(), "ADMIN".to_string()];

        let issued = issuer
            .issue("user123", "alice", "alice@example.com", roles.clone())
            .unwrap();
        let claims = issuer.validate(&issued.token).unwrap();

        assert_eq!(claims.roles, roles);
    }
}
