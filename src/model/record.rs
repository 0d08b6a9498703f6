use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use super::policy::{FieldAccess, FieldPolicy};
use crate::types::WriteMode;

/// Errors that can occur while building a Record from input
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

/// A write request against one entity, already reduced to the fields the
/// caller is allowed to set.
///
/// Client bodies go through [`Record::from_api_input`], which keeps only the
/// writable fields of the entity's [`FieldPolicy`] and silently drops the rest.
/// Internal code paths start from [`Record::internal`] and may additionally set
/// protected fields with [`Record::set_internal`].
#[derive(Debug, Clone)]
pub struct Record {
    policy: &'static FieldPolicy,
    mode: WriteMode,
    fields: HashMap<String, Value>,
    dropped: Vec<String>,
}

impl Record {
    /// Create record from API input JSON, dropping every non-writable field
    pub fn from_api_input(
        policy: &'static FieldPolicy,
        json: Value,
        mode: WriteMode,
    ) -> Result<Self, RecordError> {
        let map = match json {
            Value::Object(map) => map,
            _ => return Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        };

        let mut record = Self::internal(policy, mode);

        for (key, value) in map {
            let spec = match policy.field(&key) {
                Some(spec) if policy.is_writable(&key) => spec,
                _ => {
                    record.dropped.push(key);
                    continue;
                }
            };

            let value = spec
                .normalize(value)
                .map_err(|reason| RecordError::InvalidField { field: key.clone(), reason })?;
            record.fields.insert(key, value);
        }

        if mode.requires_all() {
            record.validate_required()?;
        }

        if !record.dropped.is_empty() {
            tracing::debug!(
                entity = policy.entity,
                fields = ?record.dropped,
                "ignoring non-writable fields in request body"
            );
        }

        Ok(record)
    }

    /// Empty record for trusted internal callers
    pub fn internal(policy: &'static FieldPolicy, mode: WriteMode) -> Self {
        Self {
            policy,
            mode,
            fields: HashMap::new(),
            dropped: Vec::new(),
        }
    }

    /// Set a writable or protected field (internal callers only).
    /// System fields and unknown fields are ignored.
    pub fn set_internal(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();

        match self.policy.field(&key).map(|f| f.access) {
            Some(FieldAccess::Writable) | Some(FieldAccess::Protected) => {
                self.fields.insert(key, value.into());
            }
            _ => {
                tracing::warn!(
                    entity = self.policy.entity,
                    "Attempted to set system or unknown field '{}' - ignoring",
                    key
                );
            }
        }
        self
    }

    /// Validate that required fields are present and not null
    pub fn validate_required(&self) -> Result<(), RecordError> {
        for spec in self.policy.writable().filter(|f| f.required) {
            match self.fields.get(spec.name) {
                None | Some(Value::Null) => {
                    return Err(RecordError::MissingRequiredField(spec.name.to_string()))
                }
                Some(_) => continue,
            }
        }
        Ok(())
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// `None` when absent, `Some(None)` when explicitly null
    pub fn text(&self, key: &str) -> Option<Option<String>> {
        self.get(key).map(|v| v.as_str().map(str::to_string))
    }

    /// `None` when absent, `Some(None)` when explicitly null
    pub fn link(&self, key: &str) -> Option<Option<Uuid>> {
        self.get(key)
            .map(|v| v.as_str().and_then(|s| Uuid::parse_str(s).ok()))
    }

    /// Keys that were present in the input but are not part of the write contract
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role;
    use serde_json::json;

    #[test]
    fn drops_protected_and_system_fields() {
        let record = Record::from_api_input(
            &role::POLICY,
            json!({
                "id": "11111111-1111-1111-1111-111111111111",
                "name": "Auditor",
                "role": "ROLE_AUDITOR",
                "created_at": "2024-01-01T00:00:00Z",
                "_links": { "self": { "href": "/api/roles/x" } }
            }),
            WriteMode::Create,
        )
        .unwrap();

        assert_eq!(record.text("name"), Some(Some("Auditor".to_string())));
        assert!(!record.get("role").is_some());
        assert!(!record.get("id").is_some());
        let mut dropped = record.dropped().to_vec();
        dropped.sort();
        assert_eq!(dropped, vec!["_links", "created_at", "id", "role"]);
    }

    #[test]
    fn protected_field_never_causes_validation_error() {
        // wrong type on a protected field is still just ignored
        let record = Record::from_api_input(
            &role::POLICY,
            json!({ "name": "Auditor", "role": 42 }),
            WriteMode::Replace,
        );
        assert!(record.is_ok());
    }

    #[test]
    fn create_requires_name_but_merge_does_not() {
        let err = Record::from_api_input(&role::POLICY, json!({ "role": "X" }), WriteMode::Create)
            .unwrap_err();
        assert!(matches!(err, RecordError::MissingRequiredField(f) if f == "name"));

        let record =
            Record::from_api_input(&role::POLICY, json!({ "role": "X" }), WriteMode::Merge).unwrap();
        assert!(record.text("name").is_none());
    }

    #[test]
    fn rejects_non_object_and_bad_types() {
        assert!(matches!(
            Record::from_api_input(&role::POLICY, json!([1, 2]), WriteMode::Create),
            Err(RecordError::InvalidJson(_))
        ));
        assert!(matches!(
            Record::from_api_input(&role::POLICY, json!({ "name": 7 }), WriteMode::Create),
            Err(RecordError::InvalidField { field, .. }) if field == "name"
        ));
    }

    #[test]
    fn internal_records_may_set_protected_but_not_system_fields() {
        let mut record = Record::internal(&role::POLICY, WriteMode::Merge);
        record.set_internal("role", "ROLE_ADMIN").set_internal("id", "nope");
        assert_eq!(record.text("role"), Some(Some("ROLE_ADMIN".to_string())));
        assert!(!record.get("id").is_some());
    }

    #[test]
    fn links_normalize_to_ids() {
        let org = Uuid::new_v4();
        let record = Record::from_api_input(
            &role::POLICY,
            json!({ "name": "Ops", "organization": format!("/api/organizations/{}", org) }),
            WriteMode::Create,
        )
        .unwrap();
        assert_eq!(record.link("organization"), Some(Some(org)));
    }
}
