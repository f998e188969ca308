// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Notification and support request route handlers.

use crate::app::AppState;
use crate::error::ApiResult;
use crate::models::auth::MessageResponse;
use crate::models::notification::{
    CreateSupportRequest, ListNotificationsResponse, ListSupportLogsResponse, NotificationInfo,
    Severity, SupportLogInfo,
};
use crate::services::auth_middleware::{AdminUser, CurrentUser};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(list_notifications, dismiss_notification, create_support, list_support),
    components(schemas(
        NotificationInfo,
        ListNotificationsResponse,
        CreateSupportRequest,
        Severity,
        SupportLogInfo,
        ListSupportLogsResponse,
    )),
    tags(
        (name = "notifications", description = "Per-user notifications"),
        (name = "support", description = "Support requests"),
    )
)]
pub struct NotificationsApiDoc;

pub fn notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/{id}", delete(dismiss_notification))
}

pub fn support_router() -> Router<AppState> {
    Router::new().route("/", get(list_support).post(create_support))
}

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    responses(
        (status = 200, description = "The caller's notifications", body = ListNotificationsResponse),
        (status = 401, description = "No active session", body = MessageResponse),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ListNotificationsResponse>> {
    let notifications: Vec<NotificationInfo> = state
        .notifications
        .list(user.user_id)
        .await?
        .iter()
        .map(NotificationInfo::from)
        .collect();
    let count = notifications.len();
    Ok(Json(ListNotificationsResponse {
        notifications,
        count,
    }))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "notifications",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification dismissed", body = MessageResponse),
        (status = 404, description = "Notification not found", body = MessageResponse),
    )
)]
pub async fn dismiss_notification(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.notifications.dismiss(user.user_id, id).await?;
    Ok(Json(MessageResponse::ok("Notification dismissed")))
}

#[utoipa::path(
    post,
    path = "/support",
    tag = "support",
    request_body = CreateSupportRequest,
    responses(
        (status = 201, description = "Support request recorded", body = MessageResponse),
        (status = 400, description = "Missing subject or content, or unknown severity", body = MessageResponse),
        (status = 401, description = "No active session", body = MessageResponse),
    )
)]
pub async fn create_support(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateSupportRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    state
        .notifications
        .create_support_log(&user, &payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok("Support request submitted")),
    ))
}

#[utoipa::path(
    get,
    path = "/support",
    tag = "support",
    responses(
        (status = 200, description = "All support requests", body = ListSupportLogsResponse),
        (status = 403, description = "Not an administrator", body = MessageResponse),
    )
)]
pub async fn list_support(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<ListSupportLogsResponse>> {
    let support_logs: Vec<SupportLogInfo> = state
        .notifications
        .list_support_logs()
        .await?
        .iter()
        .map(SupportLogInfo::from)
        .collect();
    let count = support_logs.len();
    Ok(Json(ListSupportLogsResponse {
        support_logs,
        count,
    }))
}
