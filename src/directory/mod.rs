//! External identity profiles, looked up by username.
//!
//! The directory is a collaborator outside this service. Callers must treat
//! every failure as "no data" (see `projection`).

pub mod http;
pub mod static_directory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpDirectory;
pub use static_directory::StaticDirectory;

use crate::config::DirectoryConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Profile {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
        }
    }

    /// "First Last", or whichever part exists
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("profile directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid profile directory url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("profile directory unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// `Ok(None)` when the directory has no profile for `key`
    async fn lookup(&self, key: &str) -> Result<Option<Profile>, DirectoryError>;
}

pub type SharedDirectory = Arc<dyn ProfileDirectory>;

/// HTTP directory when a base URL is configured, otherwise an empty static one
pub fn from_config(config: &DirectoryConfig) -> Result<SharedDirectory, DirectoryError> {
    match config.base_url.as_deref() {
        Some(base_url) => {
            tracing::info!("Using profile directory at {}", base_url);
            Ok(Arc::new(HttpDirectory::new(base_url, config.timeout())?))
        }
        None => {
            tracing::info!("PROFILE_DIRECTORY_URL not set, user profiles will be empty");
            Ok(Arc::new(StaticDirectory::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_joins_available_parts() {
        assert_eq!(Profile::new("Ada", "Lovelace").display_name().as_deref(), Some("Ada Lovelace"));
        let first_only = Profile { first_name: Some("Ada".into()), last_name: None };
        assert_eq!(first_only.display_name().as_deref(), Some("Ada"));
        let blank = Profile { first_name: Some(" ".into()), last_name: None };
        assert_eq!(blank.display_name(), None);
        assert_eq!(Profile::default().display_name(), None);
    }

    #[test]
    fn from_config_without_url_is_static() {
        let config = crate::config::AppConfig::development().directory;
        assert!(from_config(&config).is_ok());
    }
}
