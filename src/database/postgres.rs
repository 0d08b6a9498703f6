use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::store::Store;
use crate::config::DatabaseConfig;
use crate::model::{Organization, Role, User};

/// Idempotent bootstrap; `position` keeps insertion order for listings
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS organizations (
        position BIGSERIAL,
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS roles (
        position BIGSERIAL,
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        "role" TEXT,
        organization_id UUID REFERENCES organizations (id),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS roles_organization_id_idx ON roles (organization_id)"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        position BIGSERIAL,
        id UUID PRIMARY KEY,
        username TEXT NOT NULL,
        email TEXT,
        organization_id UUID REFERENCES organizations (id),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )"#,
];

const ORGANIZATION_COLUMNS: &str = "id, name, created_at, updated_at";
const ROLE_COLUMNS: &str = r#"id, name, "role", organization_id, created_at, updated_at"#;
const USER_COLUMNS: &str = "id, username, email, organization_id, created_at, updated_at";

/// Postgres-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        let store = Self { pool };
        store.bootstrap().await?;
        Ok(store)
    }

    pub async fn bootstrap(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        info!("Postgres schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_organization(&self, organization: &Organization) -> Result<Organization, DatabaseError> {
        let sql = format!(
            "INSERT INTO organizations ({0}) VALUES ($1, $2, $3, $4) RETURNING {0}",
            ORGANIZATION_COLUMNS
        );
        sqlx::query_as::<_, Organization>(&sql)
            .bind(organization.id)
            .bind(&organization.name)
            .bind(organization.created_at)
            .bind(organization.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "organization"))
    }

    async fn organization(&self, id: Uuid) -> Result<Option<Organization>, DatabaseError> {
        let sql = format!("SELECT {} FROM organizations WHERE id = $1", ORGANIZATION_COLUMNS);
        Ok(sqlx::query_as::<_, Organization>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn organizations(&self) -> Result<Vec<Organization>, DatabaseError> {
        let sql = format!("SELECT {} FROM organizations ORDER BY position", ORGANIZATION_COLUMNS);
        Ok(sqlx::query_as::<_, Organization>(&sql).fetch_all(&self.pool).await?)
    }

    async fn update_organization(&self, organization: &Organization) -> Result<Organization, DatabaseError> {
        let sql = format!(
            "UPDATE organizations SET name = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            ORGANIZATION_COLUMNS
        );
        sqlx::query_as::<_, Organization>(&sql)
            .bind(organization.id)
            .bind(&organization.name)
            .bind(organization.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "organization"))?
            .ok_or_else(|| DatabaseError::NotFound(format!("organization {}", organization.id)))
    }

    async fn insert_role(&self, role: &Role) -> Result<Role, DatabaseError> {
        let sql = format!(
            "INSERT INTO roles ({0}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {0}",
            ROLE_COLUMNS
        );
        sqlx::query_as::<_, Role>(&sql)
            .bind(role.id)
            .bind(&role.name)
            .bind(&role.role)
            .bind(role.organization_id)
            .bind(role.created_at)
            .bind(role.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "role"))
    }

    async fn role(&self, id: Uuid) -> Result<Option<Role>, DatabaseError> {
        let sql = format!("SELECT {} FROM roles WHERE id = $1", ROLE_COLUMNS);
        Ok(sqlx::query_as::<_, Role>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn roles(&self) -> Result<Vec<Role>, DatabaseError> {
        let sql = format!("SELECT {} FROM roles ORDER BY position", ROLE_COLUMNS);
        Ok(sqlx::query_as::<_, Role>(&sql).fetch_all(&self.pool).await?)
    }

    async fn roles_for_organization(&self, organization_id: Uuid) -> Result<Vec<Role>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM roles WHERE organization_id = $1 ORDER BY position",
            ROLE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_role(&self, role: &Role) -> Result<Role, DatabaseError> {
        let sql = format!(
            "UPDATE roles SET name = $2, organization_id = $3, updated_at = $4 WHERE id = $1 RETURNING {}",
            ROLE_COLUMNS
        );
        sqlx::query_as::<_, Role>(&sql)
            .bind(role.id)
            .bind(&role.name)
            .bind(role.organization_id)
            .bind(role.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "role"))?
            .ok_or_else(|| DatabaseError::NotFound(format!("role {}", role.id)))
    }

    async fn set_role_tag(
        &self,
        id: Uuid,
        tag: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<Role, DatabaseError> {
        let sql = format!(
            r#"UPDATE roles SET "role" = $2, updated_at = $3 WHERE id = $1 RETURNING {}"#,
            ROLE_COLUMNS
        );
        sqlx::query_as::<_, Role>(&sql)
            .bind(id)
            .bind(tag)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("role {}", id)))
    }

    async fn insert_user(&self, user: &User) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users ({0}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {0}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(user.organization_id)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "user"))
    }

    async fn user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn users(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY position", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn update_user(&self, user: &User) -> Result<User, DatabaseError> {
        let sql = format!(
            "UPDATE users SET username = $2, email = $3, organization_id = $4, updated_at = $5 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(user.organization_id)
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "user"))?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user.id)))
    }
}
