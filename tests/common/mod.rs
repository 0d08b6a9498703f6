#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde_json::Value;

use orgadmin_api::auth::{generate_jwt, Claims};
use orgadmin_api::config::AppConfig;
use orgadmin_api::database::MemoryStore;
use orgadmin_api::directory::{SharedDirectory, StaticDirectory};
use orgadmin_api::routes;
use orgadmin_api::state::AppState;

/// Router served in-process on an ephemeral port, backed by the memory store
pub struct TestServer {
    pub base_url: String,
    pub token: String,
    pub state: AppState,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_directory(Arc::new(StaticDirectory::new())).await
    }

    pub async fn spawn_with_directory(directory: SharedDirectory) -> Result<Self> {
        let config = AppConfig::development();
        let state = AppState::new(config, Arc::new(MemoryStore::new()), directory);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let app = routes::app(state.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        let mut server = Self {
            base_url: format!("http://{}", addr),
            token: String::new(),
            state,
            client: reqwest::Client::new(),
        };
        server.token = server.token_for("admin")?;
        Ok(server)
    }

    pub fn token_for(&self, access: &str) -> Result<String> {
        let security = &self.state.config.security;
        let claims = Claims::new("test-admin", "acme", access, security.jwt_expiry_hours);
        Ok(generate_jwt(&claims, &security.jwt_secret)?)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(&self.token).send().await?)
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).bearer_auth(&self.token).json(&body).send().await?)
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Response> {
        Ok(self.client.put(self.url(path)).bearer_auth(&self.token).json(&body).send().await?)
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Response> {
        Ok(self.client.patch(self.url(path)).bearer_auth(&self.token).json(&body).send().await?)
    }

    /// POST and return the `data` of a 201 response
    pub async fn create(&self, path: &str, body: Value) -> Result<Value> {
        let res = self.post(path, body).await?;
        expect_data(res, StatusCode::CREATED).await
    }

    /// GET and return the `data` of a 200 response
    pub async fn fetch(&self, path: &str) -> Result<Value> {
        let res = self.get(path).await?;
        expect_data(res, StatusCode::OK).await
    }
}

/// Assert the status and unwrap the success envelope
pub async fn expect_data(res: Response, status: StatusCode) -> Result<Value> {
    let actual = res.status();
    let body = res.json::<Value>().await?;
    anyhow::ensure!(actual == status, "expected {}, got {}: {}", status, actual, body);
    anyhow::ensure!(body["success"] == true, "success flag false or missing: {}", body);
    Ok(body["data"].clone())
}

/// Last path segment of `_links.self.href`
pub fn id_of(resource: &Value) -> String {
    resource["_links"]["self"]["href"]
        .as_str()
        .and_then(|href| href.rsplit('/').next())
        .unwrap_or_default()
        .to_string()
}

pub fn embedded<'a>(collection: &'a Value, relation: &str) -> &'a Vec<Value> {
    collection["_embedded"][relation]
        .as_array()
        .unwrap_or_else(|| panic!("missing _embedded.{}: {}", relation, collection))
}
