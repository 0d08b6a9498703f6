use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ensure_organization_link, ServiceError};
use crate::database::SharedStore;
use crate::model::{role, Record, Role};
use crate::types::WriteMode;

/// The only write path for roles.
///
/// Public handlers pass records built with `Record::from_api_input`, which can
/// never carry the protected `role` tag. `create_internal` and `assign_role_tag`
/// are for trusted code and set it through `Record::set_internal`.
#[derive(Clone)]
pub struct RoleService {
    store: SharedStore,
}

impl RoleService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, record: &Record) -> Result<Role, ServiceError> {
        let role = Role::from_record(record);
        ensure_organization_link(&self.store, role.organization_id).await?;
        self.insert(role).await
    }

    /// Create a role owned by `organization_id`; the path owner wins over any
    /// `organization` link in the body.
    pub async fn create_in_organization(
        &self,
        organization_id: Uuid,
        record: &Record,
    ) -> Result<Role, ServiceError> {
        if self.store.organization(organization_id).await?.is_none() {
            return Err(ServiceError::not_found("organization", organization_id));
        }

        let mut role = Role::from_record(record);
        role.organization_id = Some(organization_id);
        self.insert(role).await
    }

    /// Trusted creation path that may set the protected tag
    pub async fn create_internal(
        &self,
        organization_id: Option<Uuid>,
        name: &str,
        tag: Option<&str>,
    ) -> Result<Role, ServiceError> {
        let mut record = Record::internal(&role::POLICY, WriteMode::Create);
        record.set_internal("name", name);
        if let Some(tag) = tag {
            record.set_internal("role", tag);
        }
        if let Some(id) = organization_id {
            record.set_internal("organization", id.to_string());
        }
        record.validate_required()?;

        self.create(&record).await
    }

    /// Trusted update path for the protected tag
    pub async fn assign_role_tag(&self, id: Uuid, tag: Option<&str>) -> Result<Role, ServiceError> {
        let mut record = Record::internal(&role::POLICY, WriteMode::Merge);
        record.set_internal("role", tag);
        self.update(id, &record).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Role, ServiceError> {
        self.store
            .role(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("role", id))
    }

    pub async fn list(&self) -> Result<Vec<Role>, ServiceError> {
        Ok(self.store.roles().await?)
    }

    /// Roles owned by an organization, in insertion order
    pub async fn list_for_organization(&self, organization_id: Uuid) -> Result<Vec<Role>, ServiceError> {
        if self.store.organization(organization_id).await?.is_none() {
            return Err(ServiceError::not_found("organization", organization_id));
        }
        Ok(self.store.roles_for_organization(organization_id).await?)
    }

    /// Apply a record to a stored role.
    ///
    /// Client columns and the protected tag are written through separate store
    /// calls, so a client update never writes `role` back from a stale read.
    pub async fn update(&self, id: Uuid, record: &Record) -> Result<Role, ServiceError> {
        let current = self.get(id).await?;
        let mut next = current.clone();
        next.apply(record);

        if current.organization_id.is_some() && next.organization_id.is_none() {
            return Err(ServiceError::InvalidField {
                field: "organization",
                reason: "A role cannot be detached from its organization".to_string(),
            });
        }

        let fields_changed = next.name != current.name || next.organization_id != current.organization_id;
        let tag_changed = next.role != current.role;
        if !fields_changed && !tag_changed {
            debug!(role_id = %id, "update carries no changes");
            return Ok(current);
        }

        let now = Utc::now();
        let mut updated = current.clone();

        if fields_changed {
            if next.organization_id != current.organization_id {
                ensure_organization_link(&self.store, next.organization_id).await?;
            }
            next.updated_at = now;
            updated = self.store.update_role(&next).await?;
        }

        // only internal records can carry the tag
        if tag_changed {
            updated = self.store.set_role_tag(id, next.role.as_deref(), now).await?;
        }

        info!(role_id = %id, "updated role '{}'", updated.name);
        Ok(updated)
    }

    async fn insert(&self, role: Role) -> Result<Role, ServiceError> {
        let created = self.store.insert_role(&role).await?;
        info!(role_id = %created.id, "created role '{}'", created.name);
        Ok(created)
    }
}
