use thiserror::Error;

use crate::domain::role::models::RoleNameError;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be blank")]
    Blank,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),

    #[error("Email too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for event publishing operations.
///
/// Kept separate from `IdentityError`: a publish failure never fails the
/// request that triggered it, the orchestrator downgrades it to a warning.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("Failed to serialize event: {0}")]
    SerializationFailed(String),

    #[error("Failed to publish event to broker: {0}")]
    PublishFailed(String),

    #[error("Event publishing timeout: {0}")]
    Timeout(String),
}

/// Top-level error for all identity and access operations
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid role name: {0}")]
    InvalidRoleName(#[from] RoleNameError),

    #[error("At least one role name is required")]
    EmptyRoleSelection,

    // Uniqueness conflicts
    #[error("Email already in use: {0}")]
    EmailAlreadyExists(String),

    #[error("Username already in use: {0}")]
    UsernameAlreadyExists(String),

    #[error("Role already exists: {0}")]
    RoleAlreadyExists(String),

    // Absent entities
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    // Credential failure. Single uniform message regardless of whether the
    // email was unknown or the password wrong, to avoid user enumeration.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // Principal lacks a required role
    #[error("Missing required role: {0}")]
    MissingRole(String),

    // Required seed data absent. An ops defect, fatal to the request but not
    // to the process.
    #[error("Default role {0} not found")]
    MissingDefaultRole(String),

    #[error("Token error: {0}")]
    Token(#[from] auth::TokenError),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for IdentityError {
    fn from(err: anyhow::Error) -> Self {
        IdentityError::Unknown(err.to_string())
    }
}
