// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, router construction and the OpenAPI document.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::models::auth::MessageResponse;
use crate::models::settings::AppSettings;
use crate::models::version::VersionResponse;
use crate::routes::{
    auth_router, notifications_router, support_router, teleprompter_router, translator_router,
    users_router, AuthApiDoc, NotificationsApiDoc, TeleprompterApiDoc, TranslatorApiDoc,
    UsersApiDoc,
};
use crate::services::auth::{AuthConfig, AuthService};
use crate::services::auth_db::AuthDbClient;
use crate::services::db::DbClient;
use crate::services::email::EmailService;
use crate::services::notifications::NotificationService;
use crate::services::storage::UploadStorage;
use crate::services::teleprompter::TeleprompterService;
use crate::services::translator::{TranslationService, TranslatorConfig};
use crate::services::users::UserService;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{CONTENT_TYPE, COOKIE},
        HeaderValue, Method,
    },
    routing::get,
    Json, Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `TELEPROMPTER_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("TELEPROMPTER_VERSION");

pub const SERVICE_NAME: &str = "teleprompter-api";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Sessions and credentials; also backs the session extractors.
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub teleprompters: Arc<TeleprompterService>,
    pub translator: Arc<TranslationService>,
    pub notifications: Arc<NotificationService>,
    pub settings: AppSettings,
}

impl AppState {
    /// Wire every service on top of one migrated pool.
    pub fn new(
        pool: SqlitePool,
        email: EmailService,
        auth_config: AuthConfig,
        translator_config: TranslatorConfig,
        settings: AppSettings,
    ) -> anyhow::Result<Self> {
        let auth_db = AuthDbClient::new(pool.clone());
        let db = DbClient::new(pool);
        let storage = UploadStorage::new(settings.upload_dir.clone());

        let auth = Arc::new(AuthService::new(
            auth_db.clone(),
            email.clone(),
            auth_config,
        ));
        let users = Arc::new(UserService::new(
            auth_db,
            db.clone(),
            auth.clone(),
            email,
            storage.clone(),
        ));

        Ok(Self {
            auth,
            users,
            teleprompters: Arc::new(TeleprompterService::new(db.clone(), storage)),
            translator: Arc::new(TranslationService::new(translator_config)?),
            notifications: Arc::new(NotificationService::new(db)),
            settings,
        })
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/version",
    tag = "service",
    responses((status = 200, description = "Service name and version", body = VersionResponse))
)]
pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
    })
}

// ---------------------------------------------------------------------------
// OpenAPI
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    info(title = "Teleprompter API", description = "Accounts, teleprompter documents and translation"),
    paths(version_handler),
    components(schemas(VersionResponse, MessageResponse)),
    tags((name = "service", description = "Service metadata"))
)]
pub struct ApiDoc;

/// The full OpenAPI document, merged from every route module.
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(AuthApiDoc::openapi());
    doc.merge(UsersApiDoc::openapi());
    doc.merge(TeleprompterApiDoc::openapi());
    doc.merge(TranslatorApiDoc::openapi());
    doc.merge(NotificationsApiDoc::openapi());
    doc
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// CORS for a single configured origin. Credentials are allowed so the session cookie is sent.
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = match origin.parse::<HeaderValue>() {
        Ok(origin) => origin,
        Err(e) => {
            tracing::warn!(origin, error = %e, "ignoring invalid CORS_ALLOW_ORIGIN");
            return None;
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([CONTENT_TYPE, COOKIE])
            .allow_credentials(true),
    )
}

/// Build the Axum application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.settings.max_upload_bytes;
    let cors = state
        .settings
        .cors_allow_origin
        .as_deref()
        .and_then(cors_layer);

    let mut app = Router::new()
        .route("/version", get(version_handler))
        .nest("/auth", auth_router())
        .nest("/users", users_router())
        .nest("/teleprompter", teleprompter_router())
        .nest("/translator", translator_router())
        .nest("/notifications", notifications_router())
        .nest("/support", support_router())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CookieManagerLayer::new());

    if let Some(cors) = cors {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}
