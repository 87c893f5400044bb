use std::fmt;

use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for ContactAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContactAddressError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Field guarded by a uniqueness constraint in the identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    DisplayName,
    ContactAddress,
    /// A constraint the service does not map to a single field.
    Other,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::DisplayName => f.write_str("username"),
            UniqueField::ContactAddress => f.write_str("email"),
            UniqueField::Other => f.write_str("identity"),
        }
    }
}

/// Error reported by the identity store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Another principal already holds the value of this field.
    #[error("uniqueness violation on {0}")]
    UniquenessViolation(UniqueField),

    #[error("database error: {0}")]
    Database(String),
}

/// Rejection reasons of the registration workflow.
#[derive(Debug, Clone, Error)]
pub enum RegistrationError {
    // Client-caused
    #[error("username, email, and password are required")]
    MissingFields,

    #[error("invalid username: {0}")]
    InvalidDisplayName(#[from] DisplayNameError),

    #[error("invalid email: {0}")]
    InvalidContactAddress(#[from] ContactAddressError),

    #[error("user already exists")]
    AlreadyExists(UniqueField),

    // Infrastructure
    #[error("store error: {0}")]
    Store(StoreError),

    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    #[error("token error: {0}")]
    Token(#[from] JwtError),

    #[error("background task failed: {0}")]
    Task(String),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniquenessViolation(field) => RegistrationError::AlreadyExists(field),
            other => RegistrationError::Store(other),
        }
    }
}

/// Rejection reasons of the authentication workflow.
#[derive(Debug, Clone, Error)]
pub enum AuthenticationError {
    // Client-caused
    #[error("email and password are required")]
    MissingFields,

    /// Unknown address and wrong secret are deliberately the same variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    // Infrastructure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("token error: {0}")]
    Token(#[from] JwtError),

    #[error("background task failed: {0}")]
    Task(String),
}
