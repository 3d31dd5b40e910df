//! Accounts API endpoints.

use api_types::{
    account::{AccountDto, AccountListQuery, AccountNew, AccountReducedDto, AccountUpdate},
    page::PageResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{Account, AccountFilter, AccountPatch, AccountRef, NewAccount, Principal};

use crate::{ServerError, page_response, pagination, server::ServerState};

fn map_account(account: Account) -> AccountDto {
    AccountDto {
        id: account.id,
        name: account.name,
        user_id: account.user_id,
        record_ids: account.record_ids,
    }
}

pub(crate) fn map_account_ref(account: AccountRef) -> AccountReducedDto {
    AccountReducedDto {
        id: account.id,
        name: account.name,
        user_id: account.user_id,
    }
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<AccountListQuery>, ServerError>,
) -> Result<Json<PageResponse<AccountDto>>, ServerError> {
    let pagination = pagination(query.page, query.size, query.sort.as_deref())?;
    let filter = AccountFilter {
        user_id: query.user_id,
        name: query.name,
    };
    let page = state
        .engine
        .list_accounts(&principal, &filter, &pagination)
        .await?;
    Ok(Json(page_response(page, map_account)))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountNew>, ServerError>,
) -> Result<(StatusCode, Json<AccountDto>), ServerError> {
    let account = state
        .engine
        .create_account(
            &principal,
            NewAccount {
                name: payload.name,
                user_id: payload.user_id.unwrap_or(principal.id),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_account(account))))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<Json<AccountDto>, ServerError> {
    let account = state.engine.account(&principal, id).await?;
    Ok(Json(map_account(account)))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<AccountUpdate>, ServerError>,
) -> Result<Json<AccountDto>, ServerError> {
    let patch = AccountPatch {
        name: payload.name,
        user_id: payload.user_id,
    };
    let account = state.engine.update_account(&principal, id, patch).await?;
    Ok(Json(map_account(account)))
}

pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
