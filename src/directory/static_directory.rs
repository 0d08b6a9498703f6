use async_trait::async_trait;
use std::collections::HashMap;

use super::{DirectoryError, Profile, ProfileDirectory};

/// Fixed in-memory directory
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    profiles: HashMap<String, Profile>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, key: impl Into<String>, profile: Profile) -> Self {
        self.profiles.insert(key.into(), profile);
        self
    }
}

#[async_trait]
impl ProfileDirectory for StaticDirectory {
    async fn lookup(&self, key: &str) -> Result<Option<Profile>, DirectoryError> {
        Ok(self.profiles.get(key).cloned())
    }
}
