use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::role::models::Role;
use crate::domain::role::models::RoleId;
use crate::domain::role::models::RoleName;
use crate::domain::user::ports::RoleRepository;
use crate::user::errors::IdentityError;

/// PostgreSQL adapter for the role store. The unique constraint on the name
/// column backs the idempotent-create semantics under concurrency.
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(e: sqlx::Error) -> IdentityError {
    IdentityError::DatabaseError(e.to_string())
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn create(&self, role: Role) -> Result<Role, IdentityError> {
        sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2)")
            .bind(role.id.0)
            .bind(role.name.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return IdentityError::RoleAlreadyExists(
                            role.name.as_str().to_string(),
                        );
                    }
                }
                db_error(e)
            })?;

        Ok(role)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, IdentityError> {
        let row = sqlx::query("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => {
                let id: Uuid = row.try_get("id").map_err(db_error)?;
                let name: String = row.try_get("name").map_err(db_error)?;
                Ok(Some(Role {
                    id: RoleId(id),
                    name: RoleName::new(name)?,
                }))
            }
            None => Ok(None),
        }
    }
}
