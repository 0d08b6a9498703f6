use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde_json::Value;

use super::utils::{json_body, parse_id, ProjectionQuery};
use crate::api::format;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::model::{user, Record};
use crate::projection::{enhance, UserProjection};
use crate::state::AppState;
use crate::types::WriteMode;

/// GET /api/users[?projection=enhanced]
///
/// The enhanced view never fails because of the profile directory; users
/// without a profile come back with null profile fields.
pub async fn list(State(state): State<AppState>, Query(query): Query<ProjectionQuery>) -> ApiResult<Value> {
    let users = state.users.list().await?;

    let data = match UserProjection::from_query(query.projection.as_deref()) {
        UserProjection::Default => format::collection(&users, "/api/users")?,
        UserProjection::Enhanced => {
            let max_in_flight = state.config.directory.max_concurrent_lookups;
            let enhanced = enhance(users, state.directory.as_ref(), max_in_flight).await;
            format::collection(&enhanced, "/api/users?projection=enhanced")?
        }
    };
    Ok(ApiResponse::success(data))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let record = Record::from_api_input(&user::POLICY, json_body(body)?, WriteMode::Create)?;
    let user = state.users.create(&record).await?;

    tracing::info!(actor = %actor.subject, user_id = %user.id, "user created via api");
    Ok(ApiResponse::created(format::item(&user)?))
}

/// GET /api/users/:id[?projection=enhanced]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ProjectionQuery>,
) -> ApiResult<Value> {
    let user = state.users.get(parse_id("user", &id)?).await?;

    let data = match UserProjection::from_query(query.projection.as_deref()) {
        UserProjection::Default => format::item(&user)?,
        UserProjection::Enhanced => {
            let enhanced = enhance(vec![user], state.directory.as_ref(), 1).await;
            let view = enhanced
                .first()
                .ok_or_else(|| ApiError::not_found(format!("user {} not found", id)))?;
            format::item(view)?
        }
    };
    Ok(ApiResponse::success(data))
}

/// PUT /api/users/:id
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    update(state, id, body, WriteMode::Replace).await
}

/// PATCH /api/users/:id
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
    let id = parse_id("user", &id)?;
    let record = Record::from_api_input(&user::POLICY, json_body(body)?, mode)?;
    let user = state.users.update(id, &record).await?;
    Ok(ApiResponse::success(format::item(&user)?))
}
