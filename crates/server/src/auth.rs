//! Token issuing and the public authentication endpoints.

use api_types::auth::{AuthResponse, LoginRequest, RegisterRequest};
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use chrono::{Duration, Utc};
use engine::NewUser;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{ServerError, server::ServerState, users::map_user};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id.
    sub: String,
    exp: i64,
    iat: i64,
}

/// HS256 keys and token lifetime.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, ServerError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| ServerError::Internal(format!("failed to sign token: {err}")))
    }

    /// Returns the user id carried by a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<i64, ServerError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|err| ServerError::Unauthorized(format!("invalid token: {err}")))?;
        data.claims
            .sub
            .parse()
            .map_err(|_| ServerError::Unauthorized("invalid token subject".to_string()))
    }
}

pub async fn register(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, ServerError>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let user = state
        .engine
        .register(NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password: payload.password,
            currency: payload.currency,
        })
        .await?;
    tracing::info!(user_id = user.id, "user registered");

    let token = state.tokens.issue(user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: map_user(user),
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ServerError>,
) -> Result<Json<AuthResponse>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state.tokens.issue(user.id)?;
    Ok(Json(AuthResponse {
        token,
        user: map_user(user),
    }))
}
