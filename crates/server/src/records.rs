//! Records API endpoints.

use api_types::{
    page::PageResponse,
    record::{RecordDto, RecordListQuery, RecordNew, RecordUpdate},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{NewRecord, Principal, Record, RecordFilter, RecordPatch};

use crate::{
    ServerError, accounts::map_account_ref, categories::map_category, page_response, pagination,
    server::ServerState,
};

fn map_record(record: Record) -> RecordDto {
    RecordDto {
        id: record.id,
        amount: record.amount,
        label: record.label,
        note: record.note,
        date: record.date,
        account: map_account_ref(record.account),
        category: record.category.map(map_category),
    }
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<RecordListQuery>, ServerError>,
) -> Result<Json<PageResponse<RecordDto>>, ServerError> {
    let pagination = pagination(query.page, query.size, query.sort.as_deref())?;
    let filter = RecordFilter {
        label: query.label,
        note: query.note,
        date_ge: query.date_ge,
        date_lt: query.date_lt,
        account_id: query.account_id,
        category_id: query.category_id,
        user_id: query.user_id,
        amount_lt: query.amount_lt,
        amount_gt: query.amount_gt,
    };
    let page = state
        .engine
        .list_records(&principal, &filter, &pagination)
        .await?;
    Ok(Json(page_response(page, map_record)))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<RecordNew>, ServerError>,
) -> Result<(StatusCode, Json<RecordDto>), ServerError> {
    let record = state
        .engine
        .create_record(
            &principal,
            NewRecord {
                amount: payload.amount,
                label: payload.label,
                note: payload.note,
                date: payload.date,
                account_id: payload.account_id,
                category_id: payload.category_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_record(record))))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<RecordDto>, ServerError> {
    let record = state.engine.record(&principal, id).await?;
    Ok(Json(map_record(record)))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<RecordUpdate>, ServerError>,
) -> Result<Json<RecordDto>, ServerError> {
    let patch = RecordPatch {
        amount: payload.amount,
        label: payload.label,
        note: payload.note,
        date: payload.date,
        account_id: payload.account_id,
        category_id: payload.category_id,
    };
    let record = state.engine.update_record(&principal, id, patch).await?;
    Ok(Json(map_record(record)))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_record(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
