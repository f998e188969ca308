// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Authentication service for registration, login and session management.

use crate::error::{ApiError, ApiResult};
use crate::models::auth::{AuthUser, LoginRequest, RegisterRequest, User, UserRole};
use crate::services::auth_db::{AuthDbClient, CreateSessionParams, NewUser};
use crate::services::db::is_unique_violation;
use crate::services::email::EmailService;
use crate::services::logging::anonymize_email;
use anyhow::{anyhow, Context, Result};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use std::env;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime in days
    pub session_max_age_days: u64,
    /// Verification and reset code lifetime in hours
    pub verification_code_expiry_hours: u64,
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            session_max_age_days: env::var("SESSION_MAX_AGE_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .unwrap_or(7),
            verification_code_expiry_hours: env::var("VERIFICATION_CODE_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_max_age_days: 7,
            verification_code_expiry_hours: 24,
        }
    }
}

/// A freshly issued one-time code. `code` goes to the user, `hash` to the database.
pub struct IssuedCode {
    pub code: String,
    pub hash: String,
    pub expires_at: i64,
}

/// Hash a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Failed to hash password: {e}"))
}

/// Check a password against a stored PHC string. A malformed hash never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Trimmed, non-empty value of an optional request field.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Minimal shape check; the mailer rejects anything it cannot parse.
pub(crate) fn looks_like_email(email: &str) -> bool {
    matches!(email.split_once('@'), Some((local, domain)) if !local.is_empty() && domain.contains('.'))
}

/// Authentication service.
pub struct AuthService {
    db: AuthDbClient,
    email: EmailService,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new auth service.
    pub fn new(db: AuthDbClient, email: EmailService, config: AuthConfig) -> Self {
        Self { db, email, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // ========== Token Generation ==========

    /// Generate a secure random token.
    /// Returns (raw_token, hash) - raw_token is sent to user, hash is stored in DB.
    pub fn generate_token() -> (String, String) {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let raw_token = hex::encode(bytes);
        let hash = Self::hash_token(&raw_token);
        (raw_token, hash)
    }

    /// Hash a token for storage.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Generate a zero-padded 6-digit code.
    /// Returns (code, hash) like [`Self::generate_token`].
    pub fn generate_verification_code() -> (String, String) {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        let hash = Self::hash_token(&code);
        (code, hash)
    }

    /// Issue a verification or reset code valid for the configured number of hours.
    pub fn issue_code(&self) -> IssuedCode {
        let (code, hash) = Self::generate_verification_code();
        let expires_at = chrono::Utc::now().timestamp_millis()
            + self.config.verification_code_expiry_hours as i64 * MILLIS_PER_HOUR;
        IssuedCode {
            code,
            hash,
            expires_at,
        }
    }

    // ========== Registration ==========

    /// Register an unverified user and email them a verification code.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<i64> {
        let username = request.username.trim();
        let email = request.email.trim();

        if username.is_empty() || request.password.is_empty() || !looks_like_email(email) {
            return Err(ApiError::bad_request("Invalid request format"));
        }

        self.create_account(username, email, &request.password, UserRole::User)
            .await
    }

    /// Create an unverified account with a fresh code and send it out.
    /// Shared by self-registration and admin-created accounts.
    pub async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> ApiResult<i64> {
        let exists = self
            .db
            .is_username_taken(username, None)
            .await
            .context("Failed to check username")?
            || self
                .db
                .is_email_taken(email, None)
                .await
                .context("Failed to check email")?;
        if exists {
            return Err(ApiError::bad_request("Username or Email already exists"));
        }

        let password_hash = hash_password(password)?;
        let issued = self.issue_code();

        let user_id = self
            .db
            .create_user(&NewUser {
                username,
                email,
                password_hash: &password_hash,
                role,
                verified: false,
                token_hash: Some(&issued.hash),
                token_expires_at: Some(issued.expires_at),
            })
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ApiError::bad_request("Username or Email already exists")
                } else {
                    ApiError::Internal(anyhow::Error::new(e).context("Failed to create user"))
                }
            })?;

        tracing::info!(
            user_id,
            email = %anonymize_email(email),
            role = role.as_str(),
            "user registered"
        );

        if let Err(e) = self
            .email
            .send_verification_code(email, username, &issued.code)
            .await
        {
            tracing::warn!(user_id, error = ?e, "failed to send verification email");
        }

        Ok(user_id)
    }

    // ========== Login ==========

    /// Check credentials and open a session.
    /// Returns the raw session token and the logged-in user.
    pub async fn login(
        &self,
        request: &LoginRequest,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> ApiResult<(String, User)> {
        let username = non_empty(request.username.as_deref());
        let email = non_empty(request.email.as_deref());
        let password = match request.password.as_deref() {
            Some(p) if username.is_some() || email.is_some() => p,
            _ => return Err(ApiError::bad_request("Invalid request format")),
        };

        let user = match (username, email) {
            (Some(username), _) => self.db.get_user_by_username(username).await,
            (None, Some(email)) => self.db.get_user_by_email(email).await,
            (None, None) => return Err(ApiError::bad_request("Invalid request format")),
        }
        .context("Failed to get user")?;

        let user = match user {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                tracing::info!("login rejected: invalid credentials");
                return Err(ApiError::unauthorized("Invalid credentials"));
            }
        };

        if !user.verified {
            return Err(ApiError::unauthorized("User not verified"));
        }

        self.db
            .update_user_last_login(user.id)
            .await
            .context("Failed to update last login")?;

        let session_token = self
            .create_user_session(user.id, user_agent, ip_address)
            .await?;

        tracing::info!(
            user_id = user.id,
            email = %anonymize_email(&user.email),
            ip = ip_address.unwrap_or("-"),
            "user signed in"
        );

        let user = self
            .db
            .get_user_by_id(user.id)
            .await
            .context("Failed to get updated user")?
            .ok_or_else(|| anyhow!("User disappeared"))?;

        Ok((session_token, user))
    }

    /// Create a session for a user and return the session token.
    async fn create_user_session(
        &self,
        user_id: i64,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
    ) -> Result<String> {
        let (session_token, session_hash) = Self::generate_token();
        let expires_at = chrono::Utc::now().timestamp_millis()
            + (self.config.session_max_age_days as i64 * 24 * MILLIS_PER_HOUR);

        self.db
            .create_session(&CreateSessionParams {
                session_id_hash: &session_hash,
                user_id,
                expires_at,
                user_agent,
                ip_address,
            })
            .await
            .context("Failed to create session")?;

        Ok(session_token)
    }

    // ========== Session Management ==========

    /// Validate a session and return the authenticated user context.
    pub async fn validate_session(&self, session_token: &str) -> Result<Option<AuthUser>> {
        let session_hash = Self::hash_token(session_token);

        let session = match self
            .db
            .get_session(&session_hash)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            // Clean up expired session
            self.db
                .delete_session(&session_hash)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let user = match self
            .db
            .get_user_by_id(session.user_id)
            .await
            .context("Failed to get user")?
        {
            Some(user) => user,
            None => return Ok(None),
        };

        // Update last active time (fire and forget)
        if let Err(e) = self.db.touch_session(&session_hash).await {
            tracing::debug!(error = %e, "failed to touch session");
        }

        Ok(Some(AuthUser::from(&user)))
    }

    /// Sign out - invalidate session.
    pub async fn sign_out(&self, session_token: &str) -> Result<()> {
        let session_hash = Self::hash_token(session_token);
        self.db
            .delete_session(&session_hash)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Sign out all sessions for a user.
    pub async fn sign_out_all(&self, user_id: i64) -> Result<u64> {
        self.db
            .delete_user_sessions(user_id)
            .await
            .context("Failed to delete all sessions")
    }

    // ========== Bootstrap ==========

    /// Make sure a verified admin account exists. Does nothing when the username is taken.
    pub async fn ensure_admin(&self, username: &str, email: &str, password: &str) -> Result<()> {
        if self
            .db
            .get_user_by_username(username)
            .await
            .context("Failed to get user")?
            .is_some()
        {
            tracing::debug!(username, "admin account already present");
            return Ok(());
        }

        let password_hash = hash_password(password)?;
        let user_id = self
            .db
            .create_user(&NewUser {
                username,
                email,
                password_hash: &password_hash,
                role: UserRole::Admin,
                verified: true,
                token_hash: None,
                token_expires_at: None,
            })
            .await
            .context("Failed to create admin user")?;

        tracing::info!(user_id, username, "bootstrap admin created");
        Ok(())
    }
}
