use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Name of the default role attached to every newly registered user.
pub const USER_ROLE: &str = "USER";

/// Name of the role gating administrative operations.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Error for RoleName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleNameError {
    #[error("Role name must not be blank")]
    Blank,
}

/// Role entity. Creation is idempotent by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
}

impl Role {
    pub fn new(name: RoleName) -> Self {
        Self {
            id: RoleId::new(),
            name,
        }
    }
}

/// Role unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleId(pub Uuid);

impl RoleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role name value type. Non-blank after trimming, stored as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleName(String);

impl RoleName {
    /// Create a new valid role name.
    ///
    /// # Errors
    /// * `Blank` - Name is empty or whitespace only
    pub fn new(name: String) -> Result<Self, RoleNameError> {
        if name.trim().is_empty() {
            return Err(RoleNameError::Blank);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_rejects_blank() {
        assert!(matches!(
            RoleName::new("  ".to_string()),
            Err(RoleNameError::Blank)
        ));
    }

    #[test]
    fn test_role_name_preserves_value() {
        let name = RoleName::new("AUDITOR".to_string()).unwrap();
        assert_eq!(name.as_str(), "AUDITOR");
    }
}
