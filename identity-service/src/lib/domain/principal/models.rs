use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;

use crate::principal::errors::AuthenticationError;
use crate::principal::errors::ContactAddressError;
use crate::principal::errors::DisplayNameError;
use crate::principal::errors::RegistrationError;

/// Registered identity.
///
/// Created once by registration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub display_name: DisplayName,
    pub contact_address: ContactAddress,
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Principal to be inserted; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrincipal {
    pub display_name: DisplayName,
    pub contact_address: ContactAddress,
    pub secret_hash: String,
}

/// Store-assigned principal identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrincipalId(pub i64);

impl PrincipalId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PrincipalId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(PrincipalId)
    }
}

/// Display name value type
///
/// Ensures the name is 3-30 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 30;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 3 characters
    /// * `TooLong` - More than 30 characters
    pub fn new(display_name: String) -> Result<Self, DisplayNameError> {
        let length = display_name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(DisplayNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(display_name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser and caps the length at
/// 254 characters, the longest address SMTP can carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactAddress(String);

impl ContactAddress {
    const MAX_LENGTH: usize = 254;

    /// Create a new validated contact address.
    ///
    /// # Errors
    /// * `TooLong` - More than 254 characters
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, ContactAddressError> {
        let length = email.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ContactAddressError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| ContactAddress(email))
            .map_err(|e| ContactAddressError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext secret as supplied by the caller.
///
/// `Debug` is redacted so the value cannot leak through logs or error reports.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainSecret(String);

impl PlainSecret {
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlainSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainSecret([redacted])")
    }
}

/// How registration looks for an existing principal before inserting.
///
/// Both strategies reach the same outcome; `PerField` costs one extra read and
/// suits stores that cannot express an OR lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecheckStrategy {
    #[default]
    Combined,
    PerField,
}

/// Command to register a new principal with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub display_name: DisplayName,
    pub contact_address: ContactAddress,
    pub secret: PlainSecret,
}

impl RegisterCommand {
    /// Build a registration command from raw request fields.
    ///
    /// Absent and empty fields are both treated as missing.
    ///
    /// # Errors
    /// * `MissingFields` - Any of the three fields is absent or empty
    /// * `InvalidDisplayName` - Display name violates length bounds
    /// * `InvalidContactAddress` - Email is malformed
    pub fn parse(
        display_name: Option<String>,
        contact_address: Option<String>,
        secret: Option<String>,
    ) -> Result<Self, RegistrationError> {
        let (Some(display_name), Some(contact_address), Some(secret)) = (
            present(display_name),
            present(contact_address),
            present(secret),
        ) else {
            return Err(RegistrationError::MissingFields);
        };

        Ok(Self {
            display_name: DisplayName::new(display_name)?,
            contact_address: ContactAddress::new(contact_address)?,
            secret: PlainSecret::new(secret),
        })
    }
}

/// Command to authenticate a returning principal
///
/// The address is kept raw: a malformed address is indistinguishable from an
/// unknown one to the caller.
#[derive(Debug)]
pub struct AuthenticateCommand {
    pub contact_address: String,
    pub secret: PlainSecret,
}

impl AuthenticateCommand {
    /// Build a login command from raw request fields.
    ///
    /// # Errors
    /// * `MissingFields` - Either field is absent or empty
    pub fn parse(
        contact_address: Option<String>,
        secret: Option<String>,
    ) -> Result<Self, AuthenticationError> {
        let (Some(contact_address), Some(secret)) = (present(contact_address), present(secret))
        else {
            return Err(AuthenticationError::MissingFields);
        };

        Ok(Self {
            contact_address,
            secret: PlainSecret::new(secret),
        })
    }
}

/// Successful workflow outcome: a fresh token and the principal it asserts.
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub token: String,
    pub principal: Principal,
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}
