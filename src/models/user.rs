// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::auth::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request from an administrator to create an account.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// ADMIN or USER, defaults to USER
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Request to activate an account with the emailed code.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ActivateRequest {
    pub token: Option<String>,
}

/// Request to email a password reset code.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct PasswordResetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Request to set a new password, either with a reset code or from an active session.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ResetPasswordRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Optional body of `POST /users/delete/{id}`; self-deletion needs the password.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct DeleteUserRequest {
    pub password: Option<String>,
}

/// Partial account update. Absent fields are left untouched.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Response for listing users.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub count: usize,
}
