use thiserror::Error;

/// Error type for password operations.
///
/// Verification has no error variant: a mismatch and a malformed stored hash
/// both verify as `false`.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),
}
