//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for the identity service:
//! - Password hashing (Argon2id)
//! - Signed bearer token issuance and validation
//!
//! The service defines its own domain traits and adapts these implementations,
//! which keeps the domain free of cryptographic detail.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Bearer Tokens
//! ```
//! use auth::TokenIssuer;
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!", 24);
//! let issued = issuer
//!     .issue("user123", "alice", "alice@example.com", vec!["USER".to_string()])
//!     .unwrap();
//! let claims = issuer.validate(&issued.token).unwrap();
//! assert_eq!(claims.username, "alice");
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::AccessClaims;
pub use token::IssuedToken;
pub use token::TokenError;
pub use token::TokenIssuer;
