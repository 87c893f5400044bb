//! Authentication utilities library
//!
//! Provides the credential primitives used by the identity service:
//! - Password hashing (Argon2id, tunable cost)
//! - JWT encoding and signature verification
//! - Access token issuance with a fixed validity window
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("not_my_password", &hash));
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenIssuer;
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let token = issuer.issue(42, "alice@example.com").unwrap();
//!
//! let claims = issuer.validate(&token).unwrap();
//! assert_eq!(claims.sub, "42");
//! assert_eq!(claims.email, "alice@example.com");
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use issuer::TokenIssuer;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
