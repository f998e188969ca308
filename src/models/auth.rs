// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// User Role
// ============================================================================

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Can manage every account and read support logs
    Admin,
    /// Can manage their own account and documents
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::User => "USER",
        }
    }

    /// Parse a role name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(UserRole::Admin),
            "USER" => Some(UserRole::User),
            _ => None,
        }
    }
}

// ============================================================================
// Database Models
// ============================================================================

/// User record from the database.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub last_login_at: Option<i64>,
    pub verified: bool,
    /// SHA-256 of the outstanding verification or reset code
    pub token_hash: Option<String>,
    pub token_expires_at: Option<i64>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Check if the outstanding code has expired. A missing expiry counts as expired.
    pub fn is_token_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        self.token_expires_at.map_or(true, |expires_at| expires_at < now)
    }
}

/// Session record from the database.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String, // SHA-256 hash
    pub user_id: i64,
    pub created_at: i64,
    pub expires_at: i64,
    pub last_active_at: i64,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        self.expires_at < now
    }
}

// ============================================================================
// API Request Types
// ============================================================================

/// Self-service registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login with either a username or an email address.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ============================================================================
// API Response Types
// ============================================================================

/// Generic message response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Public view of a user account. Never carries the password hash or codes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub verified: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            verified: user.verified,
            created_at: format_millis(user.created_at),
            updated_at: user.updated_at.map(format_millis),
            last_login_at: user.last_login_at.map(format_millis),
        }
    }
}

/// Response after a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

/// Name of the user bound to the current session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActiveSession {
    pub active: String,
}

/// Response for `GET /auth/check-session`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub user: ActiveSession,
}

// ============================================================================
// Authenticated User Context
// ============================================================================

/// Authenticated user context extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Render epoch milliseconds as RFC 3339.
pub fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
