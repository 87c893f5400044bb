use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// Mints and validates time-bounded access tokens.
///
/// Owns the signing key. Construct one at startup and share it by reference;
/// there is no ambient key lookup.
pub struct TokenIssuer {
    jwt_handler: JwtHandler,
    validity: Duration,
}

impl TokenIssuer {
    /// Fixed validity window of every issued token.
    pub const VALIDITY_HOURS: i64 = 24;

    /// Create a token issuer.
    ///
    /// # Arguments
    /// * `secret` - Key used to sign and verify tokens
    ///
    /// # Errors
    /// * `MissingKey` - The secret is empty or whitespace only
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.iter().all(u8::is_ascii_whitespace) {
            return Err(JwtError::MissingKey);
        }

        Ok(Self {
            jwt_handler: JwtHandler::new(secret),
            validity: Duration::hours(Self::VALIDITY_HOURS),
        })
    }

    /// Length of the validity window.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a token for a principal, valid from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue(&self, principal_id: impl ToString, email: &str) -> Result<String, JwtError> {
        self.issue_at(principal_id, email, Utc::now())
    }

    /// Issue a token for a principal with an explicit issuance instant.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_at(
        &self,
        principal_id: impl ToString,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::for_principal(principal_id, email, issued_at, self.validity);
        self.jwt_handler.encode(&claims)
    }

    /// Validate a token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature does not match this issuer's key
    /// * `DecodingFailed` - Token is malformed
    /// * `TokenExpired` - Validity window has passed
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token against an explicit instant.
    ///
    /// # Errors
    /// Same as [`TokenIssuer::validate`].
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}
