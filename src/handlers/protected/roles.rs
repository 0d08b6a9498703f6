use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use super::utils::{json_body, parse_id};
use crate::api::format;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::model::{role, Record};
use crate::state::AppState;
use crate::types::WriteMode;

/// GET /api/roles
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let roles = state.roles.list().await?;
    Ok(ApiResponse::success(format::collection(&roles, "/api/roles")?))
}

/// POST /api/roles - body fields outside the write contract (e.g. `role`) are ignored
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let record = Record::from_api_input(&role::POLICY, json_body(body)?, WriteMode::Create)?;
    let role = state.roles.create(&record).await?;

    tracing::info!(
        actor = %user.subject,
        tenant = %user.tenant,
        role_id = %role.id,
        ignored = ?record.dropped(),
        "role created via api"
    );
    Ok(ApiResponse::created(format::item(&role)?))
}

/// GET /api/roles/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let role = state.roles.get(parse_id("role", &id)?).await?;
    Ok(ApiResponse::success(format::item(&role)?))
}

/// PUT /api/roles/:id
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    update(state, user, id, body, WriteMode::Replace).await
}

/// PATCH /api/roles/:id
pub async fn patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    update(state, user, id, body, WriteMode::Merge).await
}

async fn update(
    state: AppState,
    user: AuthUser,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
    mode: WriteMode,
) -> ApiResult<Value> {
    let id = parse_id("role", &id)?;
    let record = Record::from_api_input(&role::POLICY, json_body(body)?, mode)?;
    let role = state.roles.update(id, &record).await?;

    tracing::info!(
        actor = %user.subject,
        role_id = %role.id,
        ?mode,
        ignored = ?record.dropped(),
        "role written via api"
    );
    Ok(ApiResponse::success(format::item(&role)?))
}
