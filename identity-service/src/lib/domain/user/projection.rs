use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Public-safe view of a user, stripped of the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            roles: user.role_names(),
        }
    }
}

/// Process-wide cache of user projections, keyed by user id.
///
/// Entries are replaced on every projection of a fresh aggregate and
/// invalidated explicitly when a user's role set changes, so a cached view
/// never outlives a role assignment.
pub struct ProjectionCache {
    entries: RwLock<HashMap<UserId, UserView>>,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: &UserId) -> Option<UserView> {
        self.entries
            .read()
            .expect("projection cache lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn insert(&self, id: UserId, view: UserView) {
        self.entries
            .write()
            .expect("projection cache lock poisoned")
            .insert(id, view);
    }

    pub fn invalidate(&self, id: &UserId) {
        self.entries
            .write()
            .expect("projection cache lock poisoned")
            .remove(id);
    }
}

impl Default for ProjectionCache {
    fn default() -> Self {
        Self::new()
    }
}
