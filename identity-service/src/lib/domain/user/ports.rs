use async_trait::async_trait;

use crate::domain::role::models::Role;
use crate::domain::user::events::UserLoggedInEvent;
use crate::domain::user::events::UserRegisteredEvent;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::IdentityError;
use crate::user::errors::PublishError;

/// Persistence operations for the user aggregate.
///
/// The store is the single source of truth for uniqueness: `create` and
/// `update` must surface unique-constraint violations as
/// `EmailAlreadyExists` / `UsernameAlreadyExists` even when the service-level
/// exists-checks raced and passed. Users always load with their role set.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Store operation failed
    async fn create(&self, user: User) -> Result<User, IdentityError>;

    /// Retrieve a user (with roles) by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError>;

    /// Retrieve a user (with roles) by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityError>;

    /// Retrieve a user (with roles) by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError>;

    /// Fast existence check by email. An optimization only, not the
    /// correctness guarantee.
    async fn exists_by_email(&self, email: &str) -> Result<bool, IdentityError>;

    /// Fast existence check by username.
    async fn exists_by_username(&self, username: &str) -> Result<bool, IdentityError>;

    /// Persist changes to an existing user, including its role set.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Store operation failed
    async fn update(&self, user: User) -> Result<User, IdentityError>;

    /// Retrieve all users with their role sets.
    async fn list_all(&self) -> Result<Vec<User>, IdentityError>;
}

/// Persistence operations for roles.
#[async_trait]
pub trait RoleRepository: Send + Sync + 'static {
    /// Persist a new role.
    ///
    /// # Errors
    /// * `RoleAlreadyExists` - A role with this name already exists
    /// * `DatabaseError` - Store operation failed
    async fn create(&self, role: Role) -> Result<Role, IdentityError>;

    /// Retrieve a role by name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, IdentityError>;
}

/// Event publishing for identity domain events.
///
/// Each event type has its own channel. Delivery is best effort: callers
/// treat failures as warnings, never as request failures.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish a USER_REGISTERED event.
    async fn publish_user_registered(
        &self,
        event: &UserRegisteredEvent,
    ) -> Result<(), PublishError>;

    /// Publish a USER_LOGGED_IN event.
    async fn publish_user_logged_in(&self, event: &UserLoggedInEvent) -> Result<(), PublishError>;
}
