use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, Credentials, SessionStatus, Success},
        extractors::{AuthUser, MaybeAuthUser},
        repo_types::{ProfileUpdate, User, UserSummary},
        services::{self, AuthError},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/users", get(list_users))
}

fn require(field: &'static str, value: Option<String>) -> AppResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::validation(field, format!("{field} is required"))),
    }
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let Json(payload) = payload?;
    let username = require("username", payload.username)?;
    let password = require("password", payload.password)?;
    services::validate_registration(&username, &password)?;

    let user = match services::create_user(&state.db, &username, &password).await {
        Ok(u) => u,
        Err(AuthError::UsernameTaken) => {
            warn!(%username, "username already registered");
            return Err(AuthError::UsernameTaken.into());
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.sessions.create(user.id, &user.username);
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        state.cookie.set(jar, token),
        Json(AuthResponse {
            success: true,
            user_id: user.id,
            username: user.username,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let Json(payload) = payload?;
    let username = require("username", payload.username)?;
    let password = require("password", payload.password)?;

    let user = match services::verify_user(&state.db, &username, &password).await {
        Ok(u) => u,
        Err(AuthError::InvalidCredentials) => {
            warn!(%username, "login rejected");
            return Err(AppError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.sessions.create(user.id, &user.username);
    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok((
        state.cookie.set(jar, token),
        Json(AuthResponse {
            success: true,
            user_id: user.id,
            username: user.username,
        }),
    ))
}

#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<Success>) {
    if let Some(token) = state.cookie.get(&jar) {
        state.sessions.invalidate(&token);
        info!("user logged out");
    }
    (state.cookie.clear(jar), Json(Success::ok()))
}

#[instrument(skip_all)]
pub async fn session(MaybeAuthUser(identity): MaybeAuthUser) -> Json<SessionStatus> {
    Json(match identity {
        Some(id) => SessionStatus {
            authenticated: true,
            username: Some(id.username),
            user_id: Some(id.user_id),
        },
        None => SessionStatus {
            authenticated: false,
            username: None,
            user_id: None,
        },
    })
}

/// Request body of `PUT /profile`; Italian field names are accepted too.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "nome")]
    pub first_name: Option<String>,
    #[serde(default, alias = "cognome")]
    pub last_name: Option<String>,
    #[serde(default, alias = "telefono")]
    pub phone: Option<String>,
    #[serde(default, alias = "indirizzo")]
    pub address: Option<String>,
}

#[instrument(skip(state))]
pub async fn get_profile(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<User>> {
    let user = User::find_by_id(&state.db, identity.user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> AppResult<Json<Success>> {
    let Json(payload) = payload?;
    let profile = services::normalize_profile(ProfileUpdate {
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone: payload.phone,
        address: payload.address,
    })?;

    if !User::update_profile(&state.db, identity.user_id, &profile).await? {
        return Err(AppError::NotFound("user"));
    }
    info!(user_id = identity.user_id, "profile updated");
    Ok(Json(Success::ok()))
}

#[instrument(skip(state))]
pub async fn list_users(
    AuthUser(_identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(User::list(&state.db).await?))
}
