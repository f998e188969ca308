// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Account management route handlers.

use crate::app::AppState;
use crate::error::ApiResult;
use crate::models::auth::{MessageResponse, UserResponse};
use crate::models::user::{
    ActivateRequest, CreateUserRequest, DeleteUserRequest, ListUsersResponse,
    PasswordResetRequest, ResetPasswordRequest, UpdateUserRequest,
};
use crate::services::auth_middleware::{AdminUser, CurrentUser, OptionalUser};
use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_user,
        activate,
        list_users,
        get_user,
        request_password_reset,
        reset_password,
        delete_user,
        update_self,
        update_user,
    ),
    components(schemas(
        CreateUserRequest,
        ActivateRequest,
        PasswordResetRequest,
        ResetPasswordRequest,
        DeleteUserRequest,
        UpdateUserRequest,
        ListUsersResponse,
    )),
    tags((name = "users", description = "Account management"))
)]
pub struct UsersApiDoc;

pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/create", post(create_user))
        .route("/activate", post(activate))
        .route("/request-password-reset", post(request_password_reset))
        .route("/reset-password", post(reset_password))
        .route("/update", patch(update_self))
        .route("/update/{id}", patch(update_user))
        .route("/delete/{id}", post(delete_user))
        .route("/{id}", get(get_user))
}

#[utoipa::path(
    post,
    path = "/users/create",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = MessageResponse),
        (status = 400, description = "Duplicate account or invalid role", body = MessageResponse),
        (status = 403, description = "Not an administrator", body = MessageResponse),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user_id = state.users.create_user(&payload).await?;
    tracing::info!(user_id, created_by = admin.user_id, "user created by admin");
    Ok(Json(MessageResponse::ok("User created successfully")))
}

#[utoipa::path(
    post,
    path = "/users/activate",
    tag = "users",
    request_body = ActivateRequest,
    responses(
        (status = 200, description = "Account activated", body = MessageResponse),
        (status = 400, description = "Missing, expired or already used code", body = MessageResponse),
        (status = 404, description = "Unknown code", body = MessageResponse),
    )
)]
pub async fn activate(
    State(state): State<AppState>,
    Json(payload): Json<ActivateRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.activate(payload.token.as_deref()).await?;
    Ok(Json(MessageResponse::ok("Account activated successfully")))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = ListUsersResponse),
        (status = 403, description = "Not an administrator", body = MessageResponse),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<ListUsersResponse>> {
    let users: Vec<UserResponse> = state
        .users
        .list_users()
        .await?
        .iter()
        .map(UserResponse::from)
        .collect();
    let count = users.len();
    Ok(Json(ListUsersResponse { users, count }))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Not an administrator", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.get_user(id).await?;
    Ok(Json(UserResponse::from(&user)))
}

#[utoipa::path(
    post,
    path = "/users/request-password-reset",
    tag = "users",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Reset code sent", body = MessageResponse),
        (status = 400, description = "Neither username nor email given", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.request_password_reset(&payload).await?;
    Ok(Json(MessageResponse::ok("Password reset email sent")))
}

/// With a session the session user is reset directly; otherwise the emailed code is required.
#[utoipa::path(
    post,
    path = "/users/reset-password",
    tag = "users",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Missing fields or invalid code", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.reset_password(&payload, user.as_ref()).await?;
    Ok(Json(MessageResponse::ok("Password reset successfully")))
}

/// Id `-1` deletes the caller and needs their current password.
#[utoipa::path(
    post,
    path = "/users/delete/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id, or -1 for the caller")),
    request_body(content = DeleteUserRequest, description = "Required only for self-deletion"),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Password missing for self-deletion", body = MessageResponse),
        (status = 401, description = "Wrong password or no session", body = MessageResponse),
        (status = 403, description = "Not allowed to delete this user", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    payload: Option<Json<DeleteUserRequest>>,
) -> ApiResult<Json<MessageResponse>> {
    let password = payload.and_then(|Json(body)| body.password);
    state
        .users
        .delete_user(&user, id, password.as_deref())
        .await?;
    Ok(Json(MessageResponse::ok("User deleted successfully")))
}

#[utoipa::path(
    patch,
    path = "/users/update",
    tag = "users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = MessageResponse),
        (status = 400, description = "Duplicate username or email", body = MessageResponse),
        (status = 403, description = "Role change by a non-admin", body = MessageResponse),
    )
)]
pub async fn update_self(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.update_self(&user, &payload).await?;
    Ok(Json(MessageResponse::ok("User updated successfully")))
}

#[utoipa::path(
    patch,
    path = "/users/update/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = MessageResponse),
        (status = 400, description = "Duplicate username or email", body = MessageResponse),
        (status = 403, description = "Not an administrator", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.update_by_id(id, &payload).await?;
    Ok(Json(MessageResponse::ok("User updated successfully")))
}
