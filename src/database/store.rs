use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::manager::DatabaseError;
use crate::model::{Organization, Role, User};

/// Persistent entity store.
///
/// Every write is a single atomic operation: an update either replaces the
/// whole row or fails. Lists are returned in insertion order.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn insert_organization(&self, organization: &Organization) -> Result<Organization, DatabaseError>;
    async fn organization(&self, id: Uuid) -> Result<Option<Organization>, DatabaseError>;
    async fn organizations(&self) -> Result<Vec<Organization>, DatabaseError>;
    async fn update_organization(&self, organization: &Organization) -> Result<Organization, DatabaseError>;

    async fn insert_role(&self, role: &Role) -> Result<Role, DatabaseError>;
    async fn role(&self, id: Uuid) -> Result<Option<Role>, DatabaseError>;
    async fn roles(&self) -> Result<Vec<Role>, DatabaseError>;
    async fn roles_for_organization(&self, organization_id: Uuid) -> Result<Vec<Role>, DatabaseError>;
    /// Writes `name`, `organization_id` and `updated_at`. The protected `role`
    /// column keeps its stored value and the returned row carries it.
    async fn update_role(&self, role: &Role) -> Result<Role, DatabaseError>;
    /// Writes only the protected `role` column (internal callers)
    async fn set_role_tag(
        &self,
        id: Uuid,
        tag: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<Role, DatabaseError>;

    async fn insert_user(&self, user: &User) -> Result<User, DatabaseError>;
    async fn user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn users(&self) -> Result<Vec<User>, DatabaseError>;
    async fn update_user(&self, user: &User) -> Result<User, DatabaseError>;
}

pub type SharedStore = Arc<dyn Store>;
