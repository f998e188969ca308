// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Translation route handlers.

use crate::app::AppState;
use crate::models::auth::MessageResponse;
use crate::models::translation::{TextTranslationRequest, TranslationReply, TranslationResponse};
use crate::routes::form::FormData;
use crate::services::auth_middleware::CurrentUser;
use crate::services::translator::TranslationError;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(translate_text, translate_file),
    components(schemas(TextTranslationRequest, TranslationResponse)),
    tags((name = "translator", description = "LLM-backed translation"))
)]
pub struct TranslatorApiDoc;

pub fn translator_router() -> Router<AppState> {
    Router::new()
        .route("/text", post(translate_text))
        .route("/file", post(translate_file))
}

#[utoipa::path(
    post,
    path = "/translator/text",
    tag = "translator",
    request_body = TextTranslationRequest,
    responses(
        (status = 200, description = "Translation", body = TranslationResponse),
        (status = 400, description = "Empty text or target language", body = TranslationResponse),
        (status = 401, description = "No active session", body = MessageResponse),
        (status = 502, description = "Translation API failed", body = TranslationResponse),
        (status = 503, description = "Translation API not configured", body = TranslationResponse),
    )
)]
pub async fn translate_text(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(payload): Json<TextTranslationRequest>,
) -> Response {
    let result = state
        .translator
        .translate(&payload.text, &payload.target_language)
        .await;
    into_reply(result, payload.target_language.trim())
}

/// Multipart fields: `file` (PDF, DOCX or TXT) and `target_language`.
#[utoipa::path(
    post,
    path = "/translator/file",
    tag = "translator",
    responses(
        (status = 200, description = "Translation", body = TranslationResponse),
        (status = 400, description = "Missing file or target language", body = TranslationResponse),
        (status = 401, description = "No active session", body = MessageResponse),
        (status = 413, description = "File too large", body = TranslationResponse),
        (status = 415, description = "Could not extract content from file", body = TranslationResponse),
        (status = 502, description = "Translation API failed", body = TranslationResponse),
        (status = 503, description = "Translation API not configured", body = TranslationResponse),
    )
)]
pub async fn translate_file(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let form = match FormData::read(multipart).await {
        Ok(form) => form,
        Err(e) => return failure(e.status(), &e.to_string(), ""),
    };
    let target_language = form
        .text_any(&["target_language", "targetLanguage"])
        .unwrap_or_default();

    let Some(file) = form.file else {
        return failure(
            StatusCode::BAD_REQUEST,
            "File is required",
            &target_language,
        );
    };
    tracing::info!(
        user_id = user.user_id,
        file_name = %file.file_name,
        bytes = file.data.len(),
        target_language = %target_language,
        "file translation requested"
    );

    let result = state
        .translator
        .translate_file(file, &target_language)
        .await;
    into_reply(result, &target_language)
}

fn into_reply(result: Result<TranslationReply, TranslationError>, target_language: &str) -> Response {
    match result {
        Ok(reply) => Json(TranslationResponse::success(reply, target_language)).into_response(),
        Err(err) => {
            let status = error_status(&err);
            if status.is_server_error() {
                tracing::error!(error = %err, "translation failed");
            }
            failure(status, &err.to_string(), target_language)
        }
    }
}

fn error_status(err: &TranslationError) -> StatusCode {
    match err {
        TranslationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TranslationError::Extraction(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        TranslationError::Upstream(_) => StatusCode::BAD_GATEWAY,
        TranslationError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn failure(status: StatusCode, message: &str, target_language: &str) -> Response {
    (
        status,
        Json(TranslationResponse::error(message, target_language)),
    )
        .into_response()
}
