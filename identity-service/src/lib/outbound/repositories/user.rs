use std::collections::HashMap;
use std::collections::HashSet;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::role::models::RoleName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::IdentityError;

/// PostgreSQL adapter for the user store.
///
/// The `users` table carries unique constraints on username and email; those
/// constraints, not the service pre-checks, are what make concurrent
/// duplicate registrations fail. Every read joins in the role set.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &PgRow, roles: HashSet<RoleName>) -> Result<User, IdentityError> {
        let id: Uuid = row.try_get("id").map_err(db_error)?;
        let username: String = row.try_get("username").map_err(db_error)?;
        let email: String = row.try_get("email").map_err(db_error)?;
        let password_hash: String = row.try_get("password_hash").map_err(db_error)?;
        let last_login_at: Option<DateTime<Utc>> =
            row.try_get("last_login_at").map_err(db_error)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(db_error)?;

        Ok(User {
            id: UserId(id),
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            password_hash,
            roles,
            last_login_at,
            created_at,
        })
    }

    async fn roles_for(&self, user_id: Uuid) -> Result<HashSet<RoleName>, IdentityError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        names
            .into_iter()
            .map(|n| RoleName::new(n).map_err(IdentityError::from))
            .collect()
    }

    async fn fetch_one(&self, query: &str, bind: &str) -> Result<Option<User>, IdentityError> {
        let row = sqlx::query(query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => {
                let id: Uuid = row.try_get("id").map_err(db_error)?;
                let roles = self.roles_for(id).await?;
                Ok(Some(Self::row_to_user(&row, roles)?))
            }
            None => Ok(None),
        }
    }
}

fn db_error(e: sqlx::Error) -> IdentityError {
    IdentityError::DatabaseError(e.to_string())
}

fn map_create_error(e: sqlx::Error, user: &User) -> IdentityError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("users_email_key") {
                return IdentityError::EmailAlreadyExists(user.email.as_str().to_string());
            }
            if db_err.constraint() == Some("users_username_key") {
                return IdentityError::UsernameAlreadyExists(user.username.as_str().to_string());
            }
        }
    }
    db_error(e)
}

const SELECT_USER: &str =
    "SELECT id, username, email, password_hash, last_login_at, created_at FROM users";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, IdentityError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, last_login_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_create_error(e, &user))?;

        for role in &user.roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, id FROM roles WHERE name = $2
                "#,
            )
            .bind(user.id.0)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => {
                let roles = self.roles_for(id.0).await?;
                Ok(Some(Self::row_to_user(&row, roles)?))
            }
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        self.fetch_one(&format!("{} WHERE email = $1", SELECT_USER), email)
            .await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError> {
        self.fetch_one(&format!("{} WHERE username = $1", SELECT_USER), username)
            .await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, IdentityError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, IdentityError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn update(&self, user: User) -> Result<User, IdentityError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, last_login_at = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.last_login_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::UserNotFound(user.id.to_string()));
        }

        // Reconcile the role set: replace the join rows with the aggregate's
        // current roles inside the same transaction.
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user.id.0)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for role in &user.roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, id FROM roles WHERE name = $2
                "#,
            )
            .bind(user.id.0)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>, IdentityError> {
        let rows = sqlx::query(SELECT_USER)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let pairs: Vec<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT ur.user_id, r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut roles_by_user: HashMap<Uuid, HashSet<RoleName>> = HashMap::new();
        for (user_id, name) in pairs {
            roles_by_user
                .entry(user_id)
                .or_default()
                .insert(RoleName::new(name)?);
        }

        rows.iter()
            .map(|row| {
                let id: Uuid = row.try_get("id").map_err(db_error)?;
                let roles = roles_by_user.remove(&id).unwrap_or_default();
                Self::row_to_user(row, roles)
            })
            .collect()
    }
}
