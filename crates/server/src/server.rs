use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use engine::{Engine, EngineError};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{ServerError, TokenKeys, accounts, auth, categories, records, users};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: TokenKeys,
}

/// Resolves the bearer token to a [`engine::Principal`] and stores it in the
/// request extensions.
///
/// The user is loaded on every request, so a deleted user is rejected and a
/// role change applies to tokens already issued.
async fn require_bearer(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let bearer =
        bearer.map_err(|_| ServerError::Unauthorized("missing bearer token".to_string()))?;
    let user_id = state.tokens.verify(bearer.token())?;

    let principal = state
        .engine
        .principal(user_id)
        .await
        .map_err(|err| match err {
            EngineError::UserNotFound(_) => {
                ServerError::Unauthorized("unknown token subject".to_string())
            }
            other => ServerError::Engine(other),
        })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/users", get(users::list))
        .route("/users/me", get(users::me))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .put(accounts::update)
                .delete(accounts::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/records", get(records::list).post(records::create))
        .route(
            "/records/{id}",
            get(records::get)
                .put(records::update)
                .delete(records::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the HTTP application.
pub fn app(engine: Engine, tokens: TokenKeys) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        tokens,
    })
}

pub async fn run_with_listener(
    engine: Engine,
    tokens: TokenKeys,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, tokens)).await
}
