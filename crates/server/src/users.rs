//! Users API endpoints.

use api_types::{
    page::{PageQuery, PageResponse},
    user::{UserDto, UserUpdate},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{Principal, User, UserPatch};

use crate::{ServerError, page_response, pagination, server::ServerState};

pub(crate) fn map_user(user: User) -> UserDto {
    UserDto {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        role: user.role,
        currency: user.currency,
        account_ids: user.account_ids,
    }
}

pub async fn me(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<UserDto>, ServerError> {
    let user = state.engine.user(&principal, principal.id).await?;
    Ok(Json(map_user(user)))
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, ServerError>,
) -> Result<Json<PageResponse<UserDto>>, ServerError> {
    let pagination = pagination(query.page, query.size, query.sort.as_deref())?;
    let page = state.engine.list_users(&principal, &pagination).await?;
    Ok(Json(page_response(page, map_user)))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<UserDto>, ServerError> {
    let user = state.engine.user(&principal, id).await?;
    Ok(Json(map_user(user)))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<UserUpdate>, ServerError>,
) -> Result<Json<UserDto>, ServerError> {
    let patch = UserPatch {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        password: payload.password,
        currency: payload.currency,
        role: payload.role,
    };
    let user = state.engine.update_user(&principal, id, patch).await?;
    Ok(Json(map_user(user)))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(&principal, id).await?;
    tracing::info!(user_id = id, deleted_by = principal.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
