use api_types::{
    error::ErrorResponse,
    page::PageResponse,
};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::{EngineError, Page, Pagination, Sort};

pub use auth::TokenKeys;
pub use server::{app, run_with_listener};

mod accounts;
mod auth;
mod categories;
mod records;
mod server;
mod users;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Missing, malformed or expired bearer token.
    Unauthorized(String),
    /// Request that could not be decoded (body, query string or path).
    BadRequest(String),
    /// Failure that is logged and reported without details.
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::UserNotFound(_)
        | EngineError::AccountNotFound(_)
        | EngineError::CategoryNotFound(_)
        | EngineError::RecordNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::AccessDenied(_) => StatusCode::FORBIDDEN,
        EngineError::UserAlreadyExists(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::PasswordHash(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::PasswordHash(msg) => {
            tracing::error!("password hashing failed: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Internal(msg) => {
                tracing::error!("{msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

/// Builds the engine pagination from the raw query parameters.
fn pagination(
    page: Option<u64>,
    size: Option<u64>,
    sort: Option<&str>,
) -> Result<Pagination, ServerError> {
    let defaults = Pagination::default();
    let mut pagination = Pagination::new(
        page.unwrap_or(defaults.page),
        size.unwrap_or(defaults.size),
    );
    if let Some(sort) = sort.map(str::trim).filter(|s| !s.is_empty()) {
        pagination = pagination.sort(sort.parse::<Sort>()?);
    }
    Ok(pagination)
}

fn page_response<T, U>(page: Page<T>, map: impl FnMut(T) -> U) -> PageResponse<U> {
    let page = page.map(map);
    PageResponse {
        content: page.items,
        page: page.page,
        size: page.size,
        total_elements: page.total_items,
        total_pages: page.total_pages,
    }
}
