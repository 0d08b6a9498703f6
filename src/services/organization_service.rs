use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::ServiceError;
use crate::database::SharedStore;
use crate::model::{Organization, Record};

#[derive(Clone)]
pub struct OrganizationService {
    store: SharedStore,
}

impl OrganizationService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, record: &Record) -> Result<Organization, ServiceError> {
        let mut organization = Organization::new(String::new());
        organization.apply(record);

        let created = self.store.insert_organization(&organization).await?;
        info!(organization_id = %created.id, "created organization '{}'", created.name);
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<Organization, ServiceError> {
        self.store
            .organization(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("organization", id))
    }

    pub async fn list(&self) -> Result<Vec<Organization>, ServiceError> {
        Ok(self.store.organizations().await?)
    }

    pub async fn update(&self, id: Uuid, record: &Record) -> Result<Organization, ServiceError> {
        let current = self.get(id).await?;
        let mut next = current.clone();
        next.apply(record);

        if next == current {
            debug!(organization_id = %id, "update carries no changes");
            return Ok(current);
        }

        next.updated_at = Utc::now();
        let updated = self.store.update_organization(&next).await?;
        info!(organization_id = %id, "updated organization");
        Ok(updated)
    }
}
