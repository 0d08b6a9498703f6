pub mod organization_service;
pub mod role_service;
pub mod user_service;

pub use organization_service::OrganizationService;
pub use role_service::RoleService;
pub use user_service::UserService;

use thiserror::Error;
use uuid::Uuid;

use crate::database::{DatabaseError, SharedStore};
use crate::model::RecordError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("field '{field}' references unknown {entity} {id}")]
    UnknownReference { field: &'static str, entity: &'static str, id: Uuid },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound { entity, id: id.to_string() }
    }
}

/// Check an optional `organization` link before writing it
pub(crate) async fn ensure_organization_link(
    store: &SharedStore,
    organization_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    match organization_id {
        Some(id) if store.organization(id).await?.is_none() => Err(ServiceError::UnknownReference {
            field: "organization",
            entity: "organization",
            id,
        }),
        _ => Ok(()),
    }
}
