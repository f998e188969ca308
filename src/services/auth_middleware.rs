// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Authentication extractors and cookie helpers for Axum.
//!
//! - `SESSION_COOKIE_NAME`: The cookie name for sessions
//! - `CurrentUser` / `AdminUser` / `OptionalUser`: session-backed extractors
//! - `ClientInfo`: user agent and client address recorded with new sessions

use crate::app::AppState;
use crate::error::ApiError;
use crate::models::auth::AuthUser;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use std::convert::Infallible;
use tower_cookies::{Cookie, Cookies};

/// Cookie name for the session.
pub const SESSION_COOKIE_NAME: &str = "prompter_session";

/// Extract the session token from cookies.
pub fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Create a session cookie with the given token.
pub fn create_session_cookie(token: &str, max_age_days: u64, secure: bool) -> Cookie<'static> {
    let max_age_secs = max_age_days * 24 * 60 * 60;
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(tower_cookies::cookie::SameSite::Lax)
        .max_age(tower_cookies::cookie::time::Duration::seconds(
            max_age_secs as i64,
        ))
        .build()
}

/// Create a cookie that clears the session (for logout).
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .max_age(tower_cookies::cookie::time::Duration::ZERO)
        .build()
}

/// Resolve the session cookie to a user, if any.
async fn session_user(parts: &mut Parts, state: &AppState) -> Result<Option<AuthUser>, ApiError> {
    let cookies = Cookies::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| ApiError::Internal(anyhow::anyhow!("cookie layer missing: {msg}")))?;

    let Some(token) = extract_session_token(&cookies) else {
        return Ok(None);
    };

    Ok(state.auth.validate_session(&token).await?)
}

/// The user bound to a valid session. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_user(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("No active session"))
    }
}

/// A session user with the admin role. Rejects with 401 or 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::info!(user_id = user.user_id, "admin route refused");
            return Err(ApiError::forbidden("No enough permissions"));
        }
        Ok(AdminUser(user))
    }
}

/// The session user when one is present. Never rejects for a missing session.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        session_user(parts, state).await.map(OptionalUser)
    }
}

/// Request metadata stored alongside a new session.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // First hop of X-Forwarded-For, then X-Real-IP
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self {
            user_agent,
            ip_address,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
