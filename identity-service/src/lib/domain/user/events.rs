use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::User;

/// Domain event published after a registration has been committed.
///
/// Stamped at emission time, not at persistence time.
#[derive(Debug, Clone)]
pub struct UserRegisteredEvent {
    pub user_id: String,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

impl UserRegisteredEvent {
    pub fn new(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            occurred_at: Utc::now(),
        }
    }
}

/// Domain event published after a successful login has been recorded.
#[derive(Debug, Clone)]
pub struct UserLoggedInEvent {
    pub user_id: String,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

impl UserLoggedInEvent {
    pub fn new(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            occurred_at: Utc::now(),
        }
    }
}
