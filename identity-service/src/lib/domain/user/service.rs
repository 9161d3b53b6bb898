use std::collections::HashMap;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::role::models::USER_ROLE;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::projection::ProjectionCache;
use crate::domain::user::projection::UserView;
use crate::user::errors::IdentityError;
use crate::user::ports::RoleRepository;
use crate::user::ports::UserRepository;

/// Aggregate counters for the admin stats endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminStats {
    pub total_users: u64,
    /// Last successful login per user email. `None` for users that have
    /// never logged in.
    pub last_logins: HashMap<String, Option<DateTime<Utc>>>,
}

/// Domain service for user identity operations.
///
/// Registers users, tracks login timestamps, and builds public-safe
/// projections. Event emission is deliberately not handled here: the auth
/// orchestrator emits events only after this service has committed.
pub struct IdentityService<UR, RR>
where
    UR: UserRepository,
    RR: RoleRepository,
{
    users: Arc<UR>,
    roles: Arc<RR>,
    projection_cache: Arc<ProjectionCache>,
    password_hasher: auth::PasswordHasher,
}

impl<UR, RR> IdentityService<UR, RR>
where
    UR: UserRepository,
    RR: RoleRepository,
{
    pub fn new(users: Arc<UR>, roles: Arc<RR>, projection_cache: Arc<ProjectionCache>) -> Self {
        Self {
            users,
            roles,
            projection_cache,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    /// Register a new user with the default USER role.
    ///
    /// The email uniqueness check runs before the username check, so callers
    /// see a deterministic conflict order. Both checks are optimizations: a
    /// concurrent registration slipping past them is still rejected by the
    /// store's unique constraints and surfaces as the same conflict error.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `MissingDefaultRole` - The USER seed role is absent (ops defect)
    /// * `DatabaseError` - Store operation failed
    pub async fn register(&self, command: RegisterUserCommand) -> Result<User, IdentityError> {
        if self.users.exists_by_email(command.email.as_str()).await? {
            return Err(IdentityError::EmailAlreadyExists(
                command.email.as_str().to_string(),
            ));
        }
        if self
            .users
            .exists_by_username(command.username.as_str())
            .await?
        {
            return Err(IdentityError::UsernameAlreadyExists(
                command.username.as_str().to_string(),
            ));
        }

        let default_role = self
            .roles
            .find_by_name(USER_ROLE)
            .await?
            .ok_or_else(|| IdentityError::MissingDefaultRole(USER_ROLE.to_string()))?;

        let password_hash = self.password_hasher.hash(&command.password)?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            roles: [default_role.name].into_iter().collect(),
            last_login_at: None,
            created_at: Utc::now(),
        };

        let created = self.users.create(user).await?;

        tracing::info!(user_id = %created.id, "User registered");

        Ok(created)
    }

    /// Record a successful login. Idempotent, last write wins.
    pub async fn update_last_login(&self, user: &User) -> Result<User, IdentityError> {
        let mut user = user.clone();
        user.last_login_at = Some(Utc::now());
        self.users.update(user).await
    }

    /// Retrieve a user (with roles) by id.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    pub async fn get_by_id(&self, id: &UserId) -> Result<User, IdentityError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(IdentityError::UserNotFound(id.to_string()))
    }

    /// Retrieve a user by email, absence is not an error here. Callers that
    /// authenticate must collapse absence and bad passwords into the same
    /// failure.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        self.users.find_by_email(email).await
    }

    /// Build the public-safe projection of a user.
    ///
    /// Cached per user id; the role service invalidates entries when role
    /// sets change.
    pub fn to_projection(&self, user: &User) -> UserView {
        if let Some(view) = self.projection_cache.get(&user.id) {
            return view;
        }
        let view = UserView::from(user);
        self.projection_cache.insert(user.id, view.clone());
        view
    }

    /// Aggregate stats for the admin surface: total user count and last
    /// login per email.
    pub async fn admin_stats(&self) -> Result<AdminStats, IdentityError> {
        let users = self.users.list_all().await?;
        let total_users = users.len() as u64;
        let last_logins = users
            .into_iter()
            .map(|u| (u.email.as_str().to_string(), u.last_login_at))
            .collect();

        Ok(AdminStats {
            total_users,
            last_logins,
        })
    }
}
