use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::policy::{FieldKind, FieldPolicy, FieldSpec};
use super::record::Record;
use crate::types::WriteMode;

pub static POLICY: FieldPolicy = FieldPolicy {
    entity: "user",
    fields: &[
        FieldSpec::system("id"),
        FieldSpec::writable("username", FieldKind::Text).required(),
        FieldSpec::writable("email", FieldKind::Text),
        FieldSpec::writable("organization", FieldKind::Link("organizations")),
        FieldSpec::system("created_at"),
        FieldSpec::system("updated_at"),
    ],
};

/// Base user record. Profile data lives in the external directory and is
/// merged in by the `enhanced` projection.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: None,
            organization_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_record(record: &Record) -> Self {
        let mut user = Self::new(String::new());
        user.apply(record);
        user
    }

    pub fn apply(&mut self, record: &Record) {
        if let Some(Some(username)) = record.text("username") {
            self.username = username;
        }
        match record.text("email") {
            Some(email) => self.email = email,
            None if record.mode() == WriteMode::Replace => self.email = None,
            None => {}
        }
        if let Some(organization_id) = record.link("organization") {
            self.organization_id = organization_id;
        }
    }
}
