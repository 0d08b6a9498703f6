mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Json, Router};
use reqwest::StatusCode;
use serde_json::{json, Value};

use orgadmin_api::directory::{DirectoryError, HttpDirectory, Profile, ProfileDirectory, StaticDirectory};

use common::{embedded, id_of, TestServer};

struct UnreachableDirectory;

#[async_trait]
impl ProfileDirectory for UnreachableDirectory {
    async fn lookup(&self, _key: &str) -> Result<Option<Profile>, DirectoryError> {
        Err(DirectoryError::Unavailable("connection refused".into()))
    }
}

fn find<'a>(users: &'a [Value], username: &str) -> &'a Value {
    users
        .iter()
        .find(|u| u["username"] == username)
        .unwrap_or_else(|| panic!("user {} not listed", username))
}

#[tokio::test]
async fn enhanced_projection_tolerates_missing_profiles() -> Result<()> {
    let directory = StaticDirectory::new().with_profile("ada", Profile::new("Ada", "Lovelace"));
    let server = TestServer::spawn_with_directory(Arc::new(directory)).await?;

    server.create("/api/users", json!({ "username": "ada", "email": "ada@example.com" })).await?;
    server.create("/api/users", json!({ "username": "nobody" })).await?;

    let listed = server.fetch("/api/users?projection=enhanced").await?;
    let users = embedded(&listed, "users");
    assert_eq!(users.len(), 2);

    let ada = find(users, "ada");
    assert_eq!(ada["first_name"], "Ada");
    assert_eq!(ada["display_name"], "Ada Lovelace");
    assert_eq!(ada["email"], "ada@example.com");

    let nobody = find(users, "nobody");
    assert!(nobody["first_name"].is_null());
    assert!(nobody["display_name"].is_null());
    assert!(nobody["_links"]["self"]["href"].is_string());
    Ok(())
}

#[tokio::test]
async fn enhanced_projection_survives_directory_failure() -> Result<()> {
    let server = TestServer::spawn_with_directory(Arc::new(UnreachableDirectory)).await?;
    let user = server.create("/api/users", json!({ "username": "grace" })).await?;

    let listed = server.fetch("/api/users?projection=enhanced").await?;
    assert!(find(embedded(&listed, "users"), "grace")["last_name"].is_null());

    let single = server.fetch(&format!("/api/users/{}?projection=enhanced", id_of(&user))).await?;
    assert_eq!(single["username"], "grace");
    assert!(single["display_name"].is_null());
    Ok(())
}

#[tokio::test]
async fn default_and_unknown_projections_omit_profile_fields() -> Result<()> {
    let directory = StaticDirectory::new().with_profile("ada", Profile::new("Ada", "Lovelace"));
    let server = TestServer::spawn_with_directory(Arc::new(directory)).await?;
    server.create("/api/users", json!({ "username": "ada" })).await?;

    for path in ["/api/users", "/api/users?projection=inlineRoles"] {
        let listed = server.fetch(path).await?;
        let ada = find(embedded(&listed, "users"), "ada");
        assert!(ada.get("first_name").is_none(), "{} leaked profile fields", path);
    }
    Ok(())
}

#[tokio::test]
async fn enhanced_projection_over_http_directory() -> Result<()> {
    // stand-in profile service: knows only "ada"
    let fake = Router::new().route(
        "/profiles/:key",
        get(|Path(key): Path<String>| async move {
            if key == "ada" {
                Ok(Json(json!({ "first_name": "Ada", "last_name": "Lovelace" })))
            } else {
                Err(AxumStatus::NOT_FOUND)
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, fake).await;
    });

    let directory = HttpDirectory::new(&format!("http://{}", addr), Duration::from_secs(2))?;
    let server = TestServer::spawn_with_directory(Arc::new(directory)).await?;
    server.create("/api/users", json!({ "username": "ada" })).await?;
    server.create("/api/users", json!({ "username": "linus" })).await?;

    let listed = server.fetch("/api/users?projection=enhanced").await?;
    let users = embedded(&listed, "users");
    assert_eq!(find(users, "ada")["last_name"], "Lovelace");
    assert!(find(users, "linus")["last_name"].is_null());
    Ok(())
}

#[tokio::test]
async fn user_writes_follow_the_field_contract() -> Result<()> {
    let server = TestServer::spawn().await?;
    let org = server.create("/api/organizations", json!({ "name": "Acme" })).await?;

    let user = server
        .create(
            "/api/users",
            json!({
                "username": "ken",
                "email": "ken@example.com",
                "organization": org["_links"]["self"]["href"],
                "created_at": "1970-01-01T00:00:00Z"
            }),
        )
        .await?;
    assert_eq!(user["_links"]["organization"], org["_links"]["self"]);
    assert_ne!(user["created_at"], "1970-01-01T00:00:00Z");

    // PUT resets the optional email, keeps the association
    let path = format!("/api/users/{}", id_of(&user));
    let res = server.put(&path, json!({ "username": "ken" })).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let replaced = server.fetch(&path).await?;
    assert!(replaced["email"].is_null());
    assert_eq!(replaced["_links"]["organization"], org["_links"]["self"]);

    let res = server.post("/api/users", json!({ "email": "x@example.com" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
