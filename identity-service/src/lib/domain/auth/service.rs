use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use auth::TokenIssuer;

use crate::domain::user::events::UserLoggedInEvent;
use crate::domain::user::events::UserRegisteredEvent;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::projection::UserView;
use crate::domain::user::service::IdentityService;
use crate::user::errors::IdentityError;
use crate::user::ports::EventPublisher;
use crate::user::ports::RoleRepository;
use crate::user::ports::UserRepository;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Composition root for the registration and login flows.
///
/// Owns the ordering guarantees: state mutations commit through the identity
/// service first, events are emitted strictly afterwards and best effort. A
/// publish failure is downgraded to a warning and never surfaces to the
/// caller, because the state change it announces is already durable.
pub struct AuthOrchestrator<UR, RR, EP>
where
    UR: UserRepository,
    RR: RoleRepository,
    EP: EventPublisher,
{
    identity: Arc<IdentityService<UR, RR>>,
    token_issuer: Arc<TokenIssuer>,
    event_publisher: Arc<EP>,
    password_hasher: auth::PasswordHasher,
}

impl<UR, RR, EP> AuthOrchestrator<UR, RR, EP>
where
    UR: UserRepository,
    RR: RoleRepository,
    EP: EventPublisher,
{
    pub fn new(
        identity: Arc<IdentityService<UR, RR>>,
        token_issuer: Arc<TokenIssuer>,
        event_publisher: Arc<EP>,
    ) -> Self {
        Self {
            identity,
            token_issuer,
            event_publisher,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    /// Register a new user and announce it.
    ///
    /// Validation and conflict failures abort before any event is emitted.
    pub async fn register(&self, command: RegisterUserCommand) -> Result<UserView, IdentityError> {
        let user = self.identity.register(command).await?;

        let event = UserRegisteredEvent::new(&user);
        if let Err(e) = self.event_publisher.publish_user_registered(&event).await {
            tracing::warn!(
                user_id = %user.id,
                error = %e,
                "Failed to publish USER_REGISTERED event; registration is already committed"
            );
        }

        Ok(self.identity.to_projection(&user))
    }

    /// Authenticate by email and password and issue a bearer token.
    ///
    /// An unknown email and a wrong password fail identically. The token is
    /// issued before any side effect: if issuance fails, no login timestamp
    /// is written and no event is emitted.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, IdentityError> {
        let user = self
            .identity
            .get_by_email(email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        let password_matches = self.password_hasher.verify(password, &user.password_hash)?;
        if !password_matches {
            return Err(IdentityError::InvalidCredentials);
        }

        let issued = self.token_issuer.issue(
            &user.id.to_string(),
            user.username.as_str(),
            user.email.as_str(),
            user.role_names(),
        )?;

        let user = self.identity.update_last_login(&user).await?;

        let event = UserLoggedInEvent::new(&user);
        if let Err(e) = self.event_publisher.publish_user_logged_in(&event).await {
            tracing::warn!(
                user_id = %user.id,
                error = %e,
                "Failed to publish USER_LOGGED_IN event; login is already recorded"
            );
        }

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }
}
