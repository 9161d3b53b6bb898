use serde::Deserialize;
use serde::Serialize;

use crate::domain::user::events::UserLoggedInEvent;
use crate::domain::user::events::UserRegisteredEvent;

pub const USER_REGISTERED: &str = "USER_REGISTERED";
pub const USER_LOGGED_IN: &str = "USER_LOGGED_IN";

/// Wire representation of an identity domain event.
///
/// A flat key-value record; the timestamp is the emission instant in
/// ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEventMessage {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub timestamp: String,
}

impl From<&UserRegisteredEvent> for IdentityEventMessage {
    fn from(event: &UserRegisteredEvent) -> Self {
        Self {
            event_type: USER_REGISTERED.to_string(),
            user_id: event.user_id.clone(),
            email: event.email.clone(),
            timestamp: event.occurred_at.to_rfc3339(),
        }
    }
}

impl From<&UserLoggedInEvent> for IdentityEventMessage {
    fn from(event: &UserLoggedInEvent) -> Self {
        Self {
            event_type: USER_LOGGED_IN.to_string(),
            user_id: event.user_id.clone(),
            email: event.email.clone(),
            timestamp: event.occurred_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_registered_message_wire_shape() {
        let event = UserRegisteredEvent {
            user_id: "u-1".to_string(),
            email: "alice@x.com".to_string(),
            occurred_at: Utc::now(),
        };
        let message = IdentityEventMessage::from(&event);
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&message).unwrap()).unwrap();

        assert_eq!(json["type"], "USER_REGISTERED");
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["email"], "alice@x.com");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_logged_in_message_type_tag() {
        let event = UserLoggedInEvent {
            user_id: "u-1".to_string(),
            email: "alice@x.com".to_string(),
            occurred_at: Utc::now(),
        };
        let message = IdentityEventMessage::from(&event);
        assert_eq!(message.event_type, "USER_LOGGED_IN");
    }
}
