// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Teleprompter document route handlers. Every route acts on the session user's documents.

use crate::app::AppState;
use crate::error::ApiResult;
use crate::models::auth::MessageResponse;
use crate::models::teleprompter::{
    CreateTeleprompterResponse, ListTeleprompterResponse, TeleprompterDetail,
    TeleprompterSummary, UpdateTeleprompterRequest,
};
use crate::routes::form::FormData;
use crate::services::auth_middleware::CurrentUser;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_teleprompter,
        list_teleprompters,
        get_teleprompter,
        update_teleprompter,
        delete_teleprompter,
        download_file,
    ),
    components(schemas(
        CreateTeleprompterResponse,
        ListTeleprompterResponse,
        TeleprompterSummary,
        TeleprompterDetail,
        UpdateTeleprompterRequest,
    )),
    tags((name = "teleprompter", description = "Teleprompter documents"))
)]
pub struct TeleprompterApiDoc;

pub fn teleprompter_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_teleprompters))
        .route("/create", post(create_teleprompter))
        .route(
            "/{id}",
            get(get_teleprompter)
                .patch(update_teleprompter)
                .delete(delete_teleprompter),
        )
        .route("/{id}/file", get(download_file))
}

/// Multipart fields: `name`, `description`, `content`, `file`, `speed`, `type`, `language`.
/// Text extracted from `file` replaces `content`.
#[utoipa::path(
    post,
    path = "/teleprompter/create",
    tag = "teleprompter",
    responses(
        (status = 201, description = "Prompter created", body = CreateTeleprompterResponse),
        (status = 400, description = "Missing name and content, or duplicate name", body = MessageResponse),
        (status = 401, description = "No active session", body = MessageResponse),
        (status = 413, description = "File too large", body = MessageResponse),
    )
)]
pub async fn create_teleprompter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<CreateTeleprompterResponse>)> {
    let form = FormData::read(multipart).await?.into_create_teleprompter()?;
    let id = state.teleprompters.create(user.user_id, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTeleprompterResponse {
            success: true,
            message: "Prompter created successfully".to_string(),
            id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/teleprompter",
    tag = "teleprompter",
    responses(
        (status = 200, description = "The caller's prompters", body = ListTeleprompterResponse),
        (status = 404, description = "No prompters found", body = MessageResponse),
    )
)]
pub async fn list_teleprompters(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<ListTeleprompterResponse>> {
    let teleprompters: Vec<TeleprompterSummary> = state
        .teleprompters
        .list(user.user_id)
        .await?
        .iter()
        .map(TeleprompterSummary::from)
        .collect();
    let count = teleprompters.len();
    Ok(Json(ListTeleprompterResponse {
        teleprompters,
        count,
    }))
}

#[utoipa::path(
    get,
    path = "/teleprompter/{id}",
    tag = "teleprompter",
    params(("id" = i64, Path, description = "Prompter id")),
    responses(
        (status = 200, description = "Prompter", body = TeleprompterDetail),
        (status = 404, description = "Prompter not found", body = MessageResponse),
    )
)]
pub async fn get_teleprompter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<TeleprompterDetail>> {
    let prompter = state.teleprompters.get(user.user_id, id).await?;
    Ok(Json(TeleprompterDetail::from(&prompter)))
}

#[utoipa::path(
    patch,
    path = "/teleprompter/{id}",
    tag = "teleprompter",
    params(("id" = i64, Path, description = "Prompter id")),
    request_body = UpdateTeleprompterRequest,
    responses(
        (status = 200, description = "Updated prompter", body = TeleprompterDetail),
        (status = 400, description = "Duplicate name", body = MessageResponse),
        (status = 404, description = "Prompter not found", body = MessageResponse),
    )
)]
pub async fn update_teleprompter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTeleprompterRequest>,
) -> ApiResult<Json<TeleprompterDetail>> {
    let prompter = state
        .teleprompters
        .update(user.user_id, id, &payload)
        .await?;
    Ok(Json(TeleprompterDetail::from(&prompter)))
}

#[utoipa::path(
    delete,
    path = "/teleprompter/{id}",
    tag = "teleprompter",
    params(("id" = i64, Path, description = "Prompter id")),
    responses(
        (status = 200, description = "Prompter deleted", body = MessageResponse),
        (status = 404, description = "Prompter not found", body = MessageResponse),
    )
)]
pub async fn delete_teleprompter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.teleprompters.delete(user.user_id, id).await?;
    Ok(Json(MessageResponse::ok("Prompter deleted successfully")))
}

/// The uploaded file as an attachment.
#[utoipa::path(
    get,
    path = "/teleprompter/{id}/file",
    tag = "teleprompter",
    params(("id" = i64, Path, description = "Prompter id")),
    responses(
        (status = 200, description = "Stored file", content_type = "application/octet-stream"),
        (status = 404, description = "Prompter or file not found", body = MessageResponse),
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let download = state.teleprompters.download(user.user_id, id).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(&download.file_name),
        ),
    ];
    Ok((headers, download.data))
}

fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
