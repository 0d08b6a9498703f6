use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::policy::{FieldKind, FieldPolicy, FieldSpec};
use super::record::Record;

pub static POLICY: FieldPolicy = FieldPolicy {
    entity: "organization",
    fields: &[
        FieldSpec::system("id"),
        FieldSpec::writable("name", FieldKind::Text).required(),
        FieldSpec::system("created_at"),
        FieldSpec::system("updated_at"),
    ],
};

/// Aggregate root owning a set of roles
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, record: &Record) {
        if let Some(Some(name)) = record.text("name") {
            self.name = name;
        }
    }
}
