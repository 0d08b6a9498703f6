use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::policy::{FieldKind, FieldPolicy, FieldSpec};
use super::record::Record;

/// `role` is protected: clients can read it but only internal code sets it.
pub static POLICY: FieldPolicy = FieldPolicy {
    entity: "role",
    fields: &[
        FieldSpec::system("id"),
        FieldSpec::writable("name", FieldKind::Text).required(),
        FieldSpec::writable("organization", FieldKind::Link("organizations")),
        FieldSpec::protected("role"),
        FieldSpec::system("created_at"),
        FieldSpec::system("updated_at"),
    ],
};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub role: Option<String>,
    /// Exposed as the `organization` link, not as a field
    #[serde(skip_serializing)]
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>, organization_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role: None,
            organization_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a new role from a create record
    pub fn from_record(record: &Record) -> Self {
        let mut role = Self::new(String::new(), None);
        role.apply(record);
        role
    }

    /// Apply a record. Associations change only when present in the record,
    /// for every write mode. `role` is only ever present on internal records.
    pub fn apply(&mut self, record: &Record) {
        if let Some(Some(name)) = record.text("name") {
            self.name = name;
        }
        if let Some(organization_id) = record.link("organization") {
            self.organization_id = organization_id;
        }
        if let Some(role) = record.text("role") {
            self.role = role;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WriteMode;
    use serde_json::json;

    #[test]
    fn client_input_cannot_set_role_tag() {
        let record = Record::from_api_input(
            &POLICY,
            json!({ "name": "Auditor", "role": "ROLE_AUDITOR" }),
            WriteMode::Create,
        )
        .unwrap();
        let role = Role::from_record(&record);
        assert_eq!(role.name, "Auditor");
        assert_eq!(role.role, None);
    }

    #[test]
    fn update_keeps_existing_tag() {
        let mut role = Role::new("Auditor", None);
        role.role = Some("ROLE_AUDITOR".into());

        let record = Record::from_api_input(
            &POLICY,
            json!({ "id": role.id, "name": "Senior Auditor", "role": "ROLE_ROOT" }),
            WriteMode::Replace,
        )
        .unwrap();
        role.apply(&record);

        assert_eq!(role.name, "Senior Auditor");
        assert_eq!(role.role.as_deref(), Some("ROLE_AUDITOR"));
    }

    #[test]
    fn internal_record_sets_tag() {
        let mut role = Role::new("Auditor", None);
        let mut record = Record::internal(&POLICY, WriteMode::Merge);
        record.set_internal("role", "ROLE_AUDITOR");
        role.apply(&record);
        assert_eq!(role.role.as_deref(), Some("ROLE_AUDITOR"));
        assert_eq!(role.name, "Auditor");
    }

    #[test]
    fn organization_id_is_not_serialized() {
        let role = Role::new("Ops", Some(Uuid::new_v4()));
        let value = serde_json::to_value(&role).unwrap();
        assert!(value.get("organization_id").is_none());
        assert!(value.get("role").unwrap().is_null());
    }
}
