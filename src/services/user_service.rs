use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ensure_organization_link, ServiceError};
use crate::database::SharedStore;
use crate::model::{Record, User};

#[derive(Clone)]
pub struct UserService {
    store: SharedStore,
}

impl UserService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, record: &Record) -> Result<User, ServiceError> {
        let user = User::from_record(record);
        ensure_organization_link(&self.store, user.organization_id).await?;

        let created = self.store.insert_user(&user).await?;
        info!(user_id = %created.id, "created user '{}'", created.username);
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ServiceError> {
        self.store
            .user(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.users().await?)
    }

    pub async fn update(&self, id: Uuid, record: &Record) -> Result<User, ServiceError> {
        let current = self.get(id).await?;
        let mut next = current.clone();
        next.apply(record);

        if next == current {
            debug!(user_id = %id, "update carries no changes");
            return Ok(current);
        }

        if next.organization_id != current.organization_id {
            ensure_organization_link(&self.store, next.organization_id).await?;
        }

        next.updated_at = Utc::now();
        let updated = self.store.update_user(&next).await?;
        info!(user_id = %id, "updated user '{}'", updated.username);
        Ok(updated)
    }
}
