use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::utils::{json_body, parse_id};
use crate::api::format;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::model::{organization, role, Record};
use crate::state::AppState;
use crate::types::WriteMode;

/// GET /api/organizations
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let organizations = state.organizations.list().await?;
    Ok(ApiResponse::success(format::collection(&organizations, "/api/organizations")?))
}

/// POST /api/organizations
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let record = Record::from_api_input(&organization::POLICY, json_body(body)?, WriteMode::Create)?;
    let organization = state.organizations.create(&record).await?;

    tracing::info!(actor = %user.subject, organization_id = %organization.id, "organization created via api");
    Ok(ApiResponse::created(format::item(&organization)?))
}

/// GET /api/organizations/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let organization = state.organizations.get(parse_id("organization", &id)?).await?;
    Ok(ApiResponse::success(format::item(&organization)?))
}

/// PUT /api/organizations/:id
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    update(state, id, body, WriteMode::Replace).await
}

/// PATCH /api/organizations/:id
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    update(state, id, body, WriteMode::Merge).await
}

async fn update(
    state: AppState,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Value> {
    let id = parse_id("organization", &id)?;
    let record = Record::from_api_input(&organization::POLICY, json_body(body)?, mode)?;
    let organization = state.organizations.update(id, &record).await?;
    Ok(ApiResponse::success(format::item(&organization)?))
}

/// GET /api/organizations/:id/roles - exactly the roles owned by the organization
pub async fn roles_list(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let organization_id = parse_id("organization", &id)?;
    let roles = state.roles.list_for_organization(organization_id).await?;

    let self_href = format!("{}/roles", format::item_href("organizations", organization_id));
    Ok(ApiResponse::success(format::collection(&roles, self_href)?))
}

/// POST /api/organizations/:id/roles
pub async fn roles_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let organization_id = parse_id("organization", &id)?;
    let record = Record::from_api_input(&role::POLICY, json_body(body)?, WriteMode::Create)?;
    let role = state.roles.create_in_organization(organization_id, &record).await?;

    tracing::info!(actor = %user.subject, %organization_id, role_id = %role.id, "role created via api");
    Ok(ApiResponse::created(format::item(&role)?))
}
