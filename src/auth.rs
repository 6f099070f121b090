use crate::errors::{AppError, ValidationError};
use crate::extract::JsonBody;
use crate::models::{User, UserAccount};
use crate::state::AppState;
use crate::storage::persist_data;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let email = validate_registration(&payload)?;

    let mut data = state.data.lock().await;
    if data.users.iter().any(|account| account.user.email == email) {
        return Err(AppError::conflict("An account with this email already exists"));
    }

    let now = Utc::now();
    let salt = Uuid::new_v4().simple().to_string();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        created_at: now,
        updated_at: now,
    };
    let mut next = data.clone();
    next.users.push(UserAccount {
        user: user.clone(),
        password_hash: hash_password(&salt, &payload.password),
        salt,
    });
    persist_data(&state.data_path, &next).await?;
    *data = next;

    info!("registered user {}", user.email);
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful".to_string(),
            user,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();
    let user = {
        let data = state.data.lock().await;
        data.users
            .iter()
            .find(|account| account.user.email == email)
            .filter(|account| hash_password(&account.salt, &payload.password) == account.password_hash)
            .map(|account| account.user.clone())
    };
    let Some(user) = user else {
        warn!("failed login for {email}");
        return Err(AppError::unauthorized("Invalid email or password"));
    };

    let token = Uuid::new_v4().to_string();
    state.sessions.lock().await.insert(token.clone(), user.id.clone());
    info!("user {} logged in", user.email);
    Ok(Json(AuthResponse {
        user,
        access_token: token,
    }))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.lock().await.remove(token);
    }
    StatusCode::NO_CONTENT
}

pub async fn profile(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<User>, AppError> {
    authenticate(&state, &headers).await.map(Json)
}

/// Rejects requests without a live bearer token when authentication is on.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.require_auth {
        let headers = request.headers().clone();
        authenticate(&state, &headers).await?;
    }
    Ok(next.run(request).await)
}

pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer_token(headers).ok_or_else(|| AppError::unauthorized("Authentication required"))?;
    let user_id = state
        .sessions
        .lock()
        .await
        .get(token)
        .cloned()
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    let data = state.data.lock().await;
    data.users
        .iter()
        .find(|account| account.user.id == user_id)
        .map(|account| account.user.clone())
        .ok_or_else(|| AppError::unauthorized("Authentication required"))
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn validate_registration(payload: &RegisterRequest) -> Result<String, ValidationError> {
    let email = payload.email.trim().to_lowercase();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid_email {
        return Err(ValidationError::Email);
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    if payload.first_name.trim().is_empty() {
        return Err(ValidationError::MissingField("firstName"));
    }
    if payload.last_name.trim().is_empty() {
        return Err(ValidationError::MissingField("lastName"));
    }
    Ok(email)
}
