//! Categories API endpoints.
//!
//! Categories are shared by every user: anyone authenticated can read them,
//! only admins can change them.

use api_types::{
    category::{CategoryDto, CategoryListQuery, CategoryNew, CategoryUpdate},
    page::PageResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{Category, CategoryFilter, CategoryPatch, NewCategory, Principal};

use crate::{ServerError, page_response, pagination, server::ServerState};

pub(crate) fn map_category(category: Category) -> CategoryDto {
    CategoryDto {
        id: category.id,
        name: category.name,
        icon: category.icon,
        color: category.color,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<CategoryListQuery>, ServerError>,
) -> Result<Json<PageResponse<CategoryDto>>, ServerError> {
    let pagination = pagination(query.page, query.size, query.sort.as_deref())?;
    let filter = CategoryFilter { name: query.name };
    let page = state.engine.list_categories(&filter, &pagination).await?;
    Ok(Json(page_response(page, map_category)))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryNew>, ServerError>,
) -> Result<(StatusCode, Json<CategoryDto>), ServerError> {
    let category = state
        .engine
        .create_category(
            &principal,
            NewCategory {
                name: payload.name,
                icon: payload.icon,
                color: payload.color,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<CategoryDto>, ServerError> {
    let category = state.engine.category(id).await?;
    Ok(Json(map_category(category)))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryUpdate>, ServerError>,
) -> Result<Json<CategoryDto>, ServerError> {
    let patch = CategoryPatch {
        name: payload.name,
        icon: payload.icon,
        color: payload.color,
    };
    let category = state.engine.update_category(&principal, id, patch).await?;
    Ok(Json(map_category(category)))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
