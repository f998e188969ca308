// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Authentication route handlers.

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::auth::{
    ActiveSession, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    SessionResponse, UserResponse, UserRole,
};
use crate::services::auth_middleware::{
    clear_session_cookie, create_session_cookie, extract_session_token, ClientInfo, CurrentUser,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_cookies::Cookies;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(register, login, check_session, logout),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        UserResponse,
        UserRole,
        SessionResponse,
        ActiveSession,
        MessageResponse,
    )),
    tags((name = "auth", description = "Registration, login and sessions"))
)]
pub struct AuthApiDoc;

/// Create auth router with all authentication routes.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/check-session", get(check_session))
        .route("/logout", post(logout))
}

/// POST /auth/register - Create an unverified account and email its code.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = MessageResponse),
        (status = 400, description = "Invalid or duplicate account data", body = MessageResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.auth.register(&payload).await?;
    Ok(Json(MessageResponse::ok("User registered successfully")))
}

/// POST /auth/login - Check credentials and set the session cookie.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing identity or password", body = MessageResponse),
        (status = 401, description = "Invalid credentials or unverified user", body = MessageResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    client: ClientInfo,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (session_token, user) = state
        .auth
        .login(
            &payload,
            client.user_agent.as_deref(),
            client.ip_address.as_deref(),
        )
        .await?;

    cookies.add(create_session_cookie(
        &session_token,
        state.auth.config().session_max_age_days,
        state.settings.secure_cookies,
    ));

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        user: UserResponse::from(&user),
    }))
}

/// GET /auth/check-session - Name of the user bound to the session cookie.
#[utoipa::path(
    get,
    path = "/auth/check-session",
    tag = "auth",
    responses(
        (status = 200, description = "Active session", body = SessionResponse),
        (status = 401, description = "No active session", body = MessageResponse),
    )
)]
pub async fn check_session(CurrentUser(user): CurrentUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: ActiveSession {
            active: user.username,
        },
    })
}

/// POST /auth/logout - Revoke the current session and clear the cookie.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "No active session", body = MessageResponse),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> ApiResult<Json<MessageResponse>> {
    let token = extract_session_token(&cookies);
    cookies.remove(clear_session_cookie());

    let Some(token) = token else {
        return Err(ApiError::unauthorized("No active session to log out"));
    };
    if state.auth.validate_session(&token).await?.is_none() {
        return Err(ApiError::unauthorized("No active session to log out"));
    }

    state.auth.sign_out(&token).await?;
    Ok(Json(MessageResponse::ok("Logged out successfully")))
}
