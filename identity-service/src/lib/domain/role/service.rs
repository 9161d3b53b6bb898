use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::role::models::Role;
use crate::domain::role::models::RoleName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::projection::ProjectionCache;
use crate::user::errors::IdentityError;
use crate::user::ports::RoleRepository;
use crate::user::ports::UserRepository;

/// Domain service for role management.
///
/// Role creation is idempotent by name; role assignment is a union over the
/// user's existing set and invalidates the cached projection for that user.
pub struct RoleService<UR, RR>
where
    UR: UserRepository,
    RR: RoleRepository,
{
    users: Arc<UR>,
    roles: Arc<RR>,
    projection_cache: Arc<ProjectionCache>,
}

impl<UR, RR> RoleService<UR, RR>
where
    UR: UserRepository,
    RR: RoleRepository,
{
    pub fn new(users: Arc<UR>, roles: Arc<RR>, projection_cache: Arc<ProjectionCache>) -> Self {
        Self {
            users,
            roles,
            projection_cache,
        }
    }

    /// Create a role, returning the existing record when the name is already
    /// taken.
    ///
    /// A concurrent create racing past the lookup hits the store's unique
    /// constraint; the loser re-reads and returns the winning row, so the
    /// call stays idempotent under concurrency.
    ///
    /// # Errors
    /// * `InvalidRoleName` - Name is blank
    /// * `DatabaseError` - Store operation failed
    pub async fn create_role(&self, name: String) -> Result<Role, IdentityError> {
        let name = RoleName::new(name)?;

        if let Some(existing) = self.roles.find_by_name(name.as_str()).await? {
            return Ok(existing);
        }

        match self.roles.create(Role::new(name.clone())).await {
            Ok(role) => {
                tracing::info!(role = %role.name, "Role created");
                Ok(role)
            }
            Err(IdentityError::RoleAlreadyExists(_)) => self
                .roles
                .find_by_name(name.as_str())
                .await?
                .ok_or_else(|| {
                    IdentityError::Unknown(format!(
                        "Role {} conflicted on create but is absent on re-read",
                        name
                    ))
                }),
            Err(e) => Err(e),
        }
    }

    /// Add the named roles to a user's existing set.
    ///
    /// Fails fast on the first missing role name before touching the user,
    /// so a failed call leaves no partial assignment behind. Duplicates are
    /// no-ops.
    ///
    /// # Errors
    /// * `EmptyRoleSelection` - No role names given
    /// * `UserNotFound` - User does not exist
    /// * `RoleNotFound` - Named role does not exist (names the missing role)
    /// * `DatabaseError` - Store operation failed
    pub async fn assign_roles(
        &self,
        user_id: &UserId,
        role_names: HashSet<String>,
    ) -> Result<User, IdentityError> {
        if role_names.is_empty() {
            return Err(IdentityError::EmptyRoleSelection);
        }

        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound(user_id.to_string()))?;

        let mut resolved: Vec<RoleName> = Vec::with_capacity(role_names.len());
        for name in role_names {
            let name = RoleName::new(name)?;
            let role = self
                .roles
                .find_by_name(name.as_str())
                .await?
                .ok_or_else(|| IdentityError::RoleNotFound(name.as_str().to_string()))?;
            resolved.push(role.name);
        }

        user.roles.extend(resolved);
        let updated = self.users.update(user).await?;

        // The cached projection now carries a stale role set.
        self.projection_cache.invalidate(user_id);

        tracing::info!(user_id = %updated.id, roles = ?updated.role_names(), "Roles assigned");

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::projection::UserView;
    use crate::domain::user::service::tests::sample_user;
    use crate::domain::user::service::tests::user_role;
    use crate::domain::user::service::tests::MockTestRoleRepository;
    use crate::domain::user::service::tests::MockTestUserRepository;

    fn service(
        users: MockTestUserRepository,
        roles: MockTestRoleRepository,
    ) -> RoleService<MockTestUserRepository, MockTestRoleRepository> {
        RoleService::new(
            Arc::new(users),
            Arc::new(roles),
            Arc::new(ProjectionCache::new()),
        )
    }

    fn names(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_role_returns_existing_record() {
        let users = MockTestUserRepository::new();
        let mut roles = MockTestRoleRepository::new();

        let existing = user_role();
        let returned = existing.clone();
        roles
            .expect_find_by_name()
            .with(eq("USER"))
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        roles.expect_create().times(0);

        let role = service(users, roles)
            .create_role("USER".to_string())
            .await
            .unwrap();

        assert_eq!(role.id, existing.id);
    }

    #[tokio::test]
    async fn test_create_role_persists_new_role() {
        let users = MockTestUserRepository::new();
        let mut roles = MockTestRoleRepository::new();

        roles.expect_find_by_name().times(1).returning(|_| Ok(None));
        roles
            .expect_create()
            .withf(|role| role.name.as_str() == "AUDITOR")
            .times(1)
            .returning(Ok);

        let role = service(users, roles)
            .create_role("AUDITOR".to_string())
            .await
            .unwrap();

        assert_eq!(role.name.as_str(), "AUDITOR");
    }

    #[tokio::test]
    async fn test_create_role_blank_name_rejected() {
        let users = MockTestUserRepository::new();
        let roles = MockTestRoleRepository::new();

        let result = service(users, roles).create_role("   ".to_string()).await;

        assert!(matches!(
            result.unwrap_err(),
            IdentityError::InvalidRoleName(_)
        ));
    }

    #[tokio::test]
    async fn test_create_role_race_loser_returns_winner() {
        let users = MockTestUserRepository::new();
        let mut roles = MockTestRoleRepository::new();

        let winner = user_role();
        let winner_clone = winner.clone();

        // First lookup misses, the insert conflicts, the re-read sees the
        // row the concurrent winner committed.
        let mut lookups = 0;
        roles.expect_find_by_name().times(2).returning(move |_| {
            lookups += 1;
            if lookups == 1 {
                Ok(None)
            } else {
                Ok(Some(winner_clone.clone()))
            }
        });
        roles
            .expect_create()
            .times(1)
            .returning(|role| Err(IdentityError::RoleAlreadyExists(role.name.to_string())));

        let role = service(users, roles)
            .create_role("USER".to_string())
            .await
            .unwrap();

        assert_eq!(role.id, winner.id);
    }

    #[tokio::test]
    async fn test_assign_roles_unions_with_existing_set() {
        let mut users = MockTestUserRepository::new();
        let mut roles = MockTestRoleRepository::new();

        let user = sample_user(); // starts with {USER}
        let user_id = user.id;
        users
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        roles
            .expect_find_by_name()
            .times(2)
            .returning(|name| Ok(Some(Role::new(RoleName::new(name.to_string()).unwrap()))));
        users
            .expect_update()
            .withf(|user| user.role_names() == vec!["ADMIN", "AUDITOR", "USER"])
            .times(1)
            .returning(Ok);

        let updated = service(users, roles)
            .assign_roles(&user_id, names(&["ADMIN", "AUDITOR"]))
            .await
            .unwrap();

        assert_eq!(updated.role_names(), vec!["ADMIN", "AUDITOR", "USER"]);
    }

    #[tokio::test]
    async fn test_assign_roles_duplicate_is_noop() {
        let mut users = MockTestUserRepository::new();
        let mut roles = MockTestRoleRepository::new();

        let user = sample_user();
        let user_id = user.id;
        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        roles
            .expect_find_by_name()
            .with(eq("USER"))
            .times(1)
            .returning(|_| Ok(Some(user_role())));
        users
            .expect_update()
            .withf(|user| user.role_names() == vec!["USER"])
            .times(1)
            .returning(Ok);

        let updated = service(users, roles)
            .assign_roles(&user_id, names(&["USER"]))
            .await
            .unwrap();

        assert_eq!(updated.role_names(), vec!["USER"]);
    }

    #[tokio::test]
    async fn test_assign_roles_empty_set_rejected() {
        let users = MockTestUserRepository::new();
        let roles = MockTestRoleRepository::new();

        let result = service(users, roles)
            .assign_roles(&UserId::new(), HashSet::new())
            .await;

        assert!(matches!(
            result.unwrap_err(),
            IdentityError::EmptyRoleSelection
        ));
    }

    #[tokio::test]
    async fn test_assign_roles_user_not_found() {
        let mut users = MockTestUserRepository::new();
        let roles = MockTestRoleRepository::new();

        users.expect_find_by_id().times(1).returning(|_| Ok(None));

        let result = service(users, roles)
            .assign_roles(&UserId::new(), names(&["ADMIN"]))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            IdentityError::UserNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_assign_roles_fails_fast_naming_missing_role() {
        let mut users = MockTestUserRepository::new();
        let mut roles = MockTestRoleRepository::new();

        let user = sample_user();
        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        roles
            .expect_find_by_name()
            .with(eq("GHOST"))
            .times(1)
            .returning(|_| Ok(None));
        // No partial assignment side effects from the failed call.
        users.expect_update().times(0);

        let result = service(users, roles)
            .assign_roles(&UserId::new(), names(&["GHOST"]))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            IdentityError::RoleNotFound(name) if name == "GHOST"
        ));
    }

    #[tokio::test]
    async fn test_assign_roles_invalidates_cached_projection() {
        let mut users = MockTestUserRepository::new();
        let mut roles = MockTestRoleRepository::new();

        let user = sample_user();
        let user_id = user.id;
        let cache = Arc::new(ProjectionCache::new());
        cache.insert(user_id, UserView::from(&user));

        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        roles
            .expect_find_by_name()
            .times(1)
            .returning(|name| Ok(Some(Role::new(RoleName::new(name.to_string()).unwrap()))));
        users.expect_update().times(1).returning(Ok);

        let service = RoleService::new(
            Arc::new(users),
            Arc::new(roles),
            Arc::clone(&cache),
        );

        service
            .assign_roles(&user_id, names(&["ADMIN"]))
            .await
            .unwrap();

        assert!(cache.get(&user_id).is_none());
    }
}
