// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

// Router-level tests against an in-memory database, the email outbox and a
// local stand-in for the translation API. No external services needed.

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use teleprompter_api::app::{create_router, AppState, SERVICE_NAME, VERSION};
use teleprompter_api::models::settings::{AppSettings, DEFAULT_MAX_UPLOAD_BYTES};
use teleprompter_api::services::auth::AuthConfig;
use teleprompter_api::services::db::connect_in_memory;
use teleprompter_api::services::email::{EmailConfig, EmailService};
use teleprompter_api::services::translator::TranslatorConfig;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "teleprompter-test-boundary";
const ADMIN_PASSWORD: &str = "admin-secret";

struct TestApp {
    router: Router,
    email: EmailService,
    _uploads: TempDir,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    fn message(&self) -> String {
        self.json()["message"].as_str().unwrap_or_default().to_string()
    }

    /// `name=value` of the session cookie set by this response.
    fn session_cookie(&self) -> String {
        let set_cookie = self
            .headers
            .get(header::SET_COOKIE)
            .expect("no Set-Cookie header")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

async fn setup_app(translator: TranslatorConfig, max_upload_bytes: usize) -> TestApp {
    let pool = connect_in_memory().await.unwrap();
    let email = EmailService::new(EmailConfig::outbox()).unwrap();
    let uploads = tempfile::tempdir().unwrap();
    let settings = AppSettings {
        upload_dir: uploads.path().to_path_buf(),
        max_upload_bytes,
        secure_cookies: false,
        ..Default::default()
    };

    let state = AppState::new(
        pool,
        email.clone(),
        AuthConfig::default(),
        translator,
        settings,
    )
    .unwrap();
    state
        .auth
        .ensure_admin("admin", "admin@example.com", ADMIN_PASSWORD)
        .await
        .unwrap();

    TestApp {
        router: create_router(state),
        email,
        _uploads: uploads,
    }
}

async fn setup_with_translator(translator: TranslatorConfig) -> TestApp {
    setup_app(translator, DEFAULT_MAX_UPLOAD_BYTES).await
}

async fn setup() -> TestApp {
    setup_with_translator(TranslatorConfig::default()).await
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(multipart_body(fields, file))).unwrap())
            .await
    }

    /// Most recent verification or reset code mailed to `to`.
    fn last_code(&self, to: &str) -> String {
        let mail = self
            .email
            .outbox()
            .into_iter()
            .rev()
            .find(|m| m.to == to)
            .expect("no email sent");
        mail.body
            .lines()
            .map(str::trim)
            .find(|line| line.len() == 6 && line.chars().all(|c| c.is_ascii_digit()))
            .expect("no code in email")
            .to_string()
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .call(
                "POST",
                "/auth/login",
                Some(json!({"username": username, "password": password})),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.message());
        response.session_cookie()
    }

    /// Register, activate and log in a regular user.
    async fn verified_user(&self, username: &str) -> String {
        let email = format!("{username}@example.com");
        let response = self
            .call(
                "POST",
                "/auth/register",
                Some(json!({"username": username, "email": email, "password": "password1"})),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);

        let code = self.last_code(&email);
        let response = self
            .call("POST", "/users/activate", Some(json!({"token": code})), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);

        self.login(username, "password1").await
    }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

// ============================================================================
// Service
// ============================================================================

#[tokio::test]
async fn test_version_endpoint() {
    let app = setup().await;
    let response = app.call("GET", "/version", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["service"], SERVICE_NAME);
    assert_eq!(body["version"], VERSION);
    assert_eq!(VERSION.split('.').count(), 3);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup().await;
    let response = app.call("GET", "/api-docs/openapi.json", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["paths"]["/teleprompter/create"].is_object());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = setup().await;
    let response = app.call("GET", "/invalid", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_register_activate_login_logout() {
    let app = setup().await;
    let register = json!({"username": "alice", "email": "alice@example.com", "password": "pw123456"});

    let response = app
        .call("POST", "/auth/register", Some(register.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "User registered successfully");

    let response = app.call("POST", "/auth/register", Some(register), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Username or Email already exists");

    let response = app
        .call(
            "POST",
            "/auth/login",
            Some(json!({"email": "alice@example.com", "password": "pw123456"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "User not verified");

    let code = app.last_code("alice@example.com");
    let response = app
        .call("POST", "/users/activate", Some(json!({"token": code})), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Account activated successfully");

    let response = app
        .call("POST", "/users/activate", Some(json!({"token": "000000x"})), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .call(
            "POST",
            "/auth/login",
            Some(json!({"email": "alice@example.com", "password": "pw123456"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["user"]["username"], "alice");
    assert!(response.json()["user"].get("password_hash").is_none());
    let cookie = response.session_cookie();
    assert!(cookie.starts_with("prompter_session="));

    let response = app
        .call("GET", "/auth/check-session", None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["user"]["active"], "alice");

    let response = app.call("POST", "/auth/logout", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Logged out successfully");

    let response = app
        .call("GET", "/auth/check-session", None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "No active session");

    let response = app.call("POST", "/auth/logout", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "No active session to log out");
}

#[tokio::test]
async fn test_login_errors() {
    let app = setup().await;

    let response = app
        .call("POST", "/auth/login", Some(json!({"password": "x"})), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid request format");

    let response = app
        .call(
            "POST",
            "/auth/login",
            Some(json!({"username": "admin", "password": "wrong"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid credentials");

    let response = app
        .call(
            "POST",
            "/auth/login",
            Some(json!({"username": "ghost", "password": "wrong"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid credentials");
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = setup().await;
    let user_cookie = app.verified_user("bob").await;
    let admin_cookie = app.login("admin", ADMIN_PASSWORD).await;

    let response = app.call("GET", "/users", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.call("GET", "/users", None, Some(&user_cookie)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "No enough permissions");

    let response = app.call("GET", "/users", None, Some(&admin_cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["count"], 2);

    let response = app
        .call(
            "POST",
            "/users/create",
            Some(json!({"username": "carol", "email": "carol@example.com", "password": "pw", "role": "boss"})),
            Some(&admin_cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid role");

    let response = app
        .call(
            "POST",
            "/users/create",
            Some(json!({"username": "carol", "email": "carol@example.com", "password": "pw"})),
            Some(&admin_cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.last_code("carol@example.com").len(), 6);

    let response = app.call("GET", "/users/9999", None, Some(&admin_cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_password_reset_with_code_revokes_sessions() {
    let app = setup().await;
    let cookie = app.verified_user("dave").await;

    let response = app
        .call("POST", "/users/request-password-reset", Some(json!({})), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .call(
            "POST",
            "/users/request-password-reset",
            Some(json!({"email": "nobody@example.com"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .call(
            "POST",
            "/users/request-password-reset",
            Some(json!({"username": "dave"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Password reset email sent");
    let code = app.last_code("dave@example.com");

    let response = app
        .call(
            "POST",
            "/users/reset-password",
            Some(json!({"username": "dave", "token": "123", "password": "newpass"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid reset token");

    let response = app
        .call(
            "POST",
            "/users/reset-password",
            Some(json!({"username": "dave", "token": code, "password": "newpass"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .call("GET", "/auth/check-session", None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    app.login("dave", "newpass").await;
}

#[tokio::test]
async fn test_update_self_and_role_change() {
    let app = setup().await;
    let cookie = app.verified_user("erin").await;
    app.verified_user("frank").await;

    let response = app
        .call(
            "PATCH",
            "/users/update",
            Some(json!({"role": "ADMIN"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .call(
            "PATCH",
            "/users/update",
            Some(json!({"username": "frank"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Username already exists");

    let response = app
        .call(
            "PATCH",
            "/users/update",
            Some(json!({"username": "erin2"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .call("GET", "/auth/check-session", None, Some(&cookie))
        .await;
    assert_eq!(response.json()["user"]["active"], "erin2");
}

#[tokio::test]
async fn test_self_deletion_requires_password() {
    let app = setup().await;
    let cookie = app.verified_user("gina").await;

    let response = app.call("POST", "/users/delete/-1", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .call(
            "POST",
            "/users/delete/-1",
            Some(json!({"password": "wrong"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .call(
            "POST",
            "/users/delete/-1",
            Some(json!({"password": "password1"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .call("GET", "/auth/check-session", None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Teleprompter
// ============================================================================

#[tokio::test]
async fn test_teleprompter_lifecycle() {
    let app = setup().await;
    let cookie = app.verified_user("hank").await;
    let other = app.verified_user("ivy").await;

    let response = app.call("GET", "/teleprompter", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "No prompters found");

    let response = app
        .multipart("/teleprompter/create", &[("name", "Empty")], None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid request format");

    let response = app
        .multipart(
            "/teleprompter/create",
            &[("name", "Keynote"), ("speed", "4"), ("type", "1"), ("language", "en")],
            Some(("keynote.txt", "text/plain", b"Good morning,\n\n  everyone.".as_slice())),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.message());
    assert_eq!(response.message(), "Prompter created successfully");
    let id = response.json()["id"].as_i64().unwrap();

    let response = app
        .multipart(
            "/teleprompter/create",
            &[("name", "Keynote"), ("content", "again")],
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Prompter already exists");

    let response = app.call("GET", "/teleprompter", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["count"], 1);

    let uri = format!("/teleprompter/{id}");
    let response = app.call("GET", &uri, None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let detail = response.json();
    assert_eq!(detail["content"], "Good morning, everyone.");
    assert_eq!(detail["type"], 1);
    assert!(detail.get("file_path").is_none());

    let response = app.call("GET", &uri, None, Some(&other)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .call("GET", &format!("{uri}/file"), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"keynote.txt\""
    );
    assert_eq!(response.body, b"Good morning,\n\n  everyone.");

    let response = app
        .call("PATCH", &uri, Some(json!({"speed": 7})), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["speed"], 7);

    let response = app.call("DELETE", &uri, None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.call("GET", &uri, None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_teleprompter_requires_session() {
    let app = setup().await;
    let response = app
        .multipart("/teleprompter/create", &[("name", "x"), ("content", "y")], None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Notifications and support
// ============================================================================

#[tokio::test]
async fn test_activation_notification_and_support() {
    let app = setup().await;
    let cookie = app.verified_user("jack").await;
    let admin_cookie = app.login("admin", ADMIN_PASSWORD).await;

    let response = app.call("GET", "/notifications", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["count"], 1);
    let id = response.json()["notifications"][0]["id"].as_i64().unwrap();

    let uri = format!("/notifications/{id}");
    let response = app.call("DELETE", &uri, None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.call("DELETE", &uri, None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .call(
            "POST",
            "/support",
            Some(json!({"subject": "Help", "content": "Upload fails", "severity": "high"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.call("GET", "/support", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.call("GET", "/support", None, Some(&admin_cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["support_logs"][0]["severity"], "high");
}

// ============================================================================
// Translator
// ============================================================================

async fn completions(headers: HeaderMap, Json(request): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("Bearer test-key")
    {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }
    let prompt = request["messages"][1]["content"].as_str().unwrap_or_default();
    assert!(prompt.contains("English"));

    let reply = json!({"translated_text": "Good morning", "original_language": "Spanish"});
    (
        StatusCode::OK,
        Json(json!({
            "choices": [{"message": {"role": "assistant", "content": format!("```json\n{reply}\n```")}}]
        })),
    )
}

/// Serve a fake chat completions API and return its base URL.
async fn spawn_translation_api() -> String {
    let router = Router::new().route("/chat/completions", post(completions));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn translator_config(base_url: String, api_key: &str) -> TranslatorConfig {
    TranslatorConfig {
        api_key: Some(api_key.to_string()),
        base_url,
        timeout_secs: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_translate_text_without_api_key() {
    let app = setup().await;
    let cookie = app.verified_user("linguist").await;
    let response = app
        .call(
            "POST",
            "/translator/text",
            Some(json!({"text": "Hola", "targetLanguage": "English"})),
            Some(&cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["target_language"], "English");
}

#[tokio::test]
async fn test_translate_text_validation() {
    let app = setup().await;
    let cookie = app.verified_user("linguist").await;
    let response = app
        .call(
            "POST",
            "/translator/text",
            Some(json!({"text": "  ", "target_language": "English"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn test_translate_text_and_file() {
    let base_url = spawn_translation_api().await;
    let app = setup_with_translator(translator_config(base_url, "test-key")).await;
    let cookie = app.verified_user("linguist").await;

    let response = app
        .call(
            "POST",
            "/translator/text",
            Some(json!({"text": "Buenos días", "target_language": "English"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["translated_text"], "Good morning");
    assert_eq!(body["original_language"], "Spanish");

    let response = app
        .multipart(
            "/translator/file",
            &[("targetLanguage", "English")],
            Some(("greeting.txt", "text/plain", "Buenos\r\ndías".as_bytes())),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["translated_text"], "Good morning");

    let response = app
        .multipart(
            "/translator/file",
            &[("target_language", "English")],
            Some(("photo.png", "image/png", [0x89u8, 0x50, 0x4e, 0x47].as_slice())),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        response.json()["error_message"],
        "Could not extract content from file"
    );
}

#[tokio::test]
async fn test_translate_upstream_failure_is_bad_gateway() {
    let base_url = spawn_translation_api().await;
    let app = setup_with_translator(translator_config(base_url, "wrong-key")).await;
    let cookie = app.verified_user("linguist").await;

    let response = app
        .call(
            "POST",
            "/translator/text",
            Some(json!({"text": "Hola", "target_language": "English"})),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn test_translator_requires_session() {
    let base_url = spawn_translation_api().await;
    let app = setup_with_translator(translator_config(base_url, "test-key")).await;

    let response = app
        .call(
            "POST",
            "/translator/text",
            Some(json!({"text": "Hola", "target_language": "English"})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "No active session");

    let response = app
        .multipart(
            "/translator/file",
            &[("target_language", "English")],
            Some(("greeting.txt", "text/plain", b"Hola".as_slice())),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_oversized_upload_is_payload_too_large() {
    let app = setup_app(TranslatorConfig::default(), 1024).await;
    let cookie = app.verified_user("presenter").await;
    let script = vec![b'a'; 4096];

    let response = app
        .multipart(
            "/teleprompter/create",
            &[("name", "Keynote")],
            Some(("keynote.txt", "text/plain", script.as_slice())),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.message(), "File too large");

    let response = app
        .multipart(
            "/translator/file",
            &[("target_language", "English")],
            Some(("keynote.txt", "text/plain", script.as_slice())),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json()["error_message"], "File too large");
}
