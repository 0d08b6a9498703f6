use serde_json::Value;
use uuid::Uuid;

/// Who may write a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    /// Assigned by the system (ids, timestamps). Never accepted from any input.
    System,
    /// Part of the client write contract
    Writable,
    /// Settable by internal code paths only; dropped from client input
    Protected,
}

/// Value shape accepted for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Association to another collection. Accepts a bare id or a link
    /// ending in `/<collection>/<id>`.
    Link(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub access: FieldAccess,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn system(name: &'static str) -> Self {
        Self { name, access: FieldAccess::System, kind: FieldKind::Text, required: false }
    }

    pub const fn writable(name: &'static str, kind: FieldKind) -> Self {
        Self { name, access: FieldAccess::Writable, kind, required: false }
    }

    pub const fn protected(name: &'static str) -> Self {
        Self { name, access: FieldAccess::Protected, kind: FieldKind::Text, required: false }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Check a submitted value against the field kind and return its normalized form.
    /// Links are normalized to the bare id string.
    pub fn normalize(&self, value: Value) -> Result<Value, String> {
        if value.is_null() {
            return if self.required {
                Err("This field is required".to_string())
            } else {
                Ok(Value::Null)
            };
        }

        match self.kind {
            FieldKind::Text => match value {
                Value::String(s) if self.required && s.trim().is_empty() => {
                    Err("Must not be empty".to_string())
                }
                Value::String(s) => Ok(Value::String(s)),
                other => Err(format!("Expected a string, got {}", json_type(&other))),
            },
            FieldKind::Link(collection) => match value {
                Value::String(s) => parse_link(collection, &s)
                    .map(|id| Value::String(id.to_string()))
                    .ok_or_else(|| format!("Expected a {} id or link, got '{}'", collection, s)),
                other => Err(format!("Expected a link, got {}", json_type(&other))),
            },
        }
    }
}

/// Per-entity declaration of the external write contract
#[derive(Debug)]
pub struct FieldPolicy {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FieldPolicy {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_writable(&self, name: &str) -> bool {
        matches!(self.field(name), Some(f) if f.access == FieldAccess::Writable)
    }

    pub fn writable(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.access == FieldAccess::Writable)
    }
}

/// Parse `<uuid>`, `/api/<collection>/<uuid>` or `http://host/api/<collection>/<uuid>`
pub fn parse_link(collection: &str, raw: &str) -> Option<Uuid> {
    let trimmed = raw.trim().trim_end_matches('/');
    if let Ok(id) = Uuid::parse_str(trimmed) {
        return Some(id);
    }

    let mut segments = trimmed.rsplit('/');
    let id = segments.next()?;
    if segments.next()? != collection {
        return None;
    }
    Uuid::parse_str(id).ok()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
