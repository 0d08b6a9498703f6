/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// How a client body is applied to an entity.
/// Used by both the field filtering boundary and the entity `apply` methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    Create,  // POST: required writable fields must be present
    Replace, // PUT: required fields must be present, absent optional scalars reset
    Merge,   // PATCH: only present fields are applied
}

impl WriteMode {
    /// Whether required writable fields must appear in the body
    pub fn requires_all(&self) -> bool {
        matches!(self, WriteMode::Create | WriteMode::Replace)
    }
}
