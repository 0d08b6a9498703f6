use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use super::{DirectoryError, Profile, ProfileDirectory};

/// Directory served over HTTP at `GET {base_url}/profiles/{key}`.
/// 404 means no profile; any other non-success status is an error.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::Unavailable(format!("{} cannot be a base url", base_url)));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn profile_url(&self, key: &str) -> Result<Url, DirectoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DirectoryError::Unavailable(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .push("profiles")
            .push(key);
        Ok(url)
    }
}

#[async_trait]
impl ProfileDirectory for HttpDirectory {
    async fn lookup(&self, key: &str) -> Result<Option<Profile>, DirectoryError> {
        let url = self.profile_url(key)?;
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let profile = response.error_for_status()?.json::<Profile>().await?;
        Ok(Some(profile))
    }
}
