use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity assertion carried by an access token.
///
/// `sub` is the principal identifier and `email` its contact address.
/// Timestamps are Unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (principal identifier)
    pub sub: String,

    /// Contact address of the principal
    pub email: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a principal, valid for `validity` from `issued_at`.
    ///
    /// # Arguments
    /// * `principal_id` - Unique principal identifier
    /// * `email` - Contact address of the principal
    /// * `issued_at` - Issuance instant
    /// * `validity` - Length of the validity window
    pub fn for_principal(
        principal_id: impl ToString,
        email: impl Into<String>,
        issued_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        Self {
            sub: principal_id.to_string(),
            email: email.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + validity).timestamp(),
        }
    }

    /// Check if token is expired.
    ///
    /// A token is still valid at exactly its expiration second.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    /// Expiration as a UTC datetime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
