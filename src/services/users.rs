// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Account management: activation, password reset, updates and deletion.

use crate::error::{ApiError, ApiResult};
use crate::models::auth::{AuthUser, User, UserRole};
use crate::models::notification::NotificationKind;
use crate::models::user::{
    CreateUserRequest, PasswordResetRequest, ResetPasswordRequest, UpdateUserRequest,
};
use crate::services::auth::{hash_password, looks_like_email, non_empty, verify_password, AuthService};
use crate::services::auth_db::AuthDbClient;
use crate::services::db::{is_unique_violation, DbClient};
use crate::services::email::EmailService;
use crate::services::logging::anonymize_email;
use crate::services::storage::UploadStorage;
use anyhow::Context;
use std::sync::Arc;

/// Path id that stands for "the session user" on delete.
pub const SELF_USER_ID: i64 = -1;

const ACTIVATED_MESSAGE: &str = "Your account has been activated. Welcome to Teleprompter!";
const PASSWORD_CHANGED_MESSAGE: &str = "Your password was changed.";

fn parse_role(role: &str) -> ApiResult<UserRole> {
    UserRole::parse(role).ok_or_else(|| ApiError::bad_request("Invalid role"))
}

/// User account service.
pub struct UserService {
    auth_db: AuthDbClient,
    db: DbClient,
    auth: Arc<AuthService>,
    email: EmailService,
    storage: UploadStorage,
}

impl UserService {
    pub fn new(
        auth_db: AuthDbClient,
        db: DbClient,
        auth: Arc<AuthService>,
        email: EmailService,
        storage: UploadStorage,
    ) -> Self {
        Self {
            auth_db,
            db,
            auth,
            email,
            storage,
        }
    }

    /// Admin-created account. Goes through the same verification as self-registration.
    pub async fn create_user(&self, request: &CreateUserRequest) -> ApiResult<i64> {
        let username = request.username.trim();
        let email = request.email.trim();
        if username.is_empty() || request.password.is_empty() || !looks_like_email(email) {
            return Err(ApiError::bad_request("Invalid request format"));
        }

        let role = match non_empty(request.role.as_deref()) {
            Some(role) => parse_role(role)?,
            None => UserRole::User,
        };

        self.auth
            .create_account(username, email, &request.password, role)
            .await
    }

    /// Verify an account with the emailed code.
    pub async fn activate(&self, token: Option<&str>) -> ApiResult<()> {
        let token = non_empty(token).ok_or_else(|| ApiError::bad_request("No Token provided"))?;

        let mut user = self
            .auth_db
            .get_user_by_token_hash(&AuthService::hash_token(token))
            .await
            .context("Failed to look up verification code")?
            .ok_or_else(|| ApiError::not_found("Invalid verification code"))?;

        if user.verified {
            return Err(ApiError::bad_request("The user is already verified"));
        }
        if user.is_token_expired() {
            return Err(ApiError::bad_request("Verification code has expired"));
        }

        user.verified = true;
        user.token_hash = None;
        user.token_expires_at = None;
        self.auth_db
            .update_user(&user)
            .await
            .context("Failed to activate user")?;

        self.notify(user.id, NotificationKind::AccountActivated, ACTIVATED_MESSAGE)
            .await;

        tracing::info!(user_id = user.id, "account activated");
        Ok(())
    }

    /// Email a reset code. The account stays usable until the reset happens.
    pub async fn request_password_reset(&self, request: &PasswordResetRequest) -> ApiResult<()> {
        let user = match (
            non_empty(request.username.as_deref()),
            non_empty(request.email.as_deref()),
        ) {
            (Some(username), _) => self.auth_db.get_user_by_username(username).await,
            (None, Some(email)) => self.auth_db.get_user_by_email(email).await,
            (None, None) => return Err(ApiError::bad_request("Username or Email is required")),
        }
        .context("Failed to get user")?;

        let mut user = user.ok_or_else(|| ApiError::not_found("User not found"))?;

        let issued = self.auth.issue_code();
        user.token_hash = Some(issued.hash);
        user.token_expires_at = Some(issued.expires_at);
        self.auth_db
            .update_user(&user)
            .await
            .context("Failed to store reset code")?;

        if let Err(e) = self
            .email
            .send_password_reset_code(&user.email, &user.username, &issued.code)
            .await
        {
            tracing::warn!(user_id = user.id, error = ?e, "failed to send password reset email");
        }

        tracing::info!(
            user_id = user.id,
            email = %anonymize_email(&user.email),
            "password reset requested"
        );
        Ok(())
    }

    /// Set a new password. A session user needs no code; everyone else must
    /// present the emailed code, and all their sessions are revoked afterwards.
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
        session_user: Option<&AuthUser>,
    ) -> ApiResult<()> {
        let token = non_empty(request.token.as_deref());

        let user = match session_user {
            Some(current) => self.load_user(current.user_id).await?,
            None => {
                if token.is_none() {
                    return Err(ApiError::bad_request("No Token provided"));
                }
                let email = non_empty(request.email.as_deref());
                let username = non_empty(request.username.as_deref());
                if email.is_none() && username.is_none() {
                    return Err(ApiError::bad_request("Email or Username required"));
                }
                self.find_by_email_or_username(email, username)
                    .await?
                    .ok_or_else(|| ApiError::not_found("User not found"))?
            }
        };

        let password = match request.password.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return Err(ApiError::bad_request("Password required")),
        };

        if session_user.is_none() {
            let presented = token.map(AuthService::hash_token);
            let matches = user.token_hash.is_some() && user.token_hash == presented;
            if !matches || user.is_token_expired() {
                tracing::info!(user_id = user.id, "password reset rejected: bad code");
                return Err(ApiError::bad_request("Invalid reset token"));
            }
        }

        let mut user = user;
        user.password_hash = hash_password(password)?;
        user.token_hash = None;
        user.token_expires_at = None;
        user.verified = true;
        self.auth_db
            .update_user(&user)
            .await
            .context("Failed to update password")?;

        if session_user.is_none() {
            let revoked = self.auth.sign_out_all(user.id).await?;
            tracing::info!(user_id = user.id, revoked, "password reset with code");
        } else {
            tracing::info!(user_id = user.id, "password changed from session");
        }

        self.notify(user.id, NotificationKind::PasswordChanged, PASSWORD_CHANGED_MESSAGE)
            .await;
        Ok(())
    }

    async fn find_by_email_or_username(
        &self,
        email: Option<&str>,
        username: Option<&str>,
    ) -> ApiResult<Option<User>> {
        if let Some(email) = email {
            if let Some(user) = self
                .auth_db
                .get_user_by_email(email)
                .await
                .context("Failed to get user")?
            {
                return Ok(Some(user));
            }
        }
        match username {
            Some(username) => Ok(self
                .auth_db
                .get_user_by_username(username)
                .await
                .context("Failed to get user")?),
            None => Ok(None),
        }
    }

    pub async fn get_user(&self, user_id: i64) -> ApiResult<User> {
        self.load_user(user_id).await
    }

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        Ok(self
            .auth_db
            .list_users()
            .await
            .context("Failed to list users")?)
    }

    async fn load_user(&self, user_id: i64) -> ApiResult<User> {
        self.auth_db
            .get_user_by_id(user_id)
            .await
            .context("Failed to get user")?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    /// Delete an account. `SELF_USER_ID` deletes the caller after a password check;
    /// any other id needs admin rights unless it is the caller's own.
    pub async fn delete_user(
        &self,
        current: &AuthUser,
        user_id: i64,
        password: Option<&str>,
    ) -> ApiResult<()> {
        let target_id = if user_id == SELF_USER_ID {
            let password = match password {
                Some(p) if !p.is_empty() => p,
                _ => {
                    return Err(ApiError::bad_request(
                        "Password required for self-deletion",
                    ))
                }
            };
            let me = self.load_user(current.user_id).await?;
            if !verify_password(password, &me.password_hash) {
                return Err(ApiError::unauthorized("Invalid password"));
            }
            me.id
        } else {
            user_id
        };

        let target = self.load_user(target_id).await?;
        if !current.is_admin() && current.user_id != target.id {
            return Err(ApiError::forbidden("No enough permissions"));
        }

        self.remove_account(&target).await?;
        tracing::info!(
            user_id = target.id,
            deleted_by = current.user_id,
            "user deleted"
        );
        Ok(())
    }

    /// Remove uploads, documents, notifications, sessions and the user row.
    async fn remove_account(&self, user: &User) -> ApiResult<()> {
        if let Err(e) = self.storage.remove_user_dir(user.id).await {
            tracing::error!(user_id = user.id, error = ?e, "failed to remove upload directory");
        }

        let prompters = self
            .db
            .delete_user_teleprompters(user.id)
            .await
            .context("Failed to delete teleprompters")?;
        self.db
            .delete_user_notifications(user.id)
            .await
            .context("Failed to delete notifications")?;
        self.auth.sign_out_all(user.id).await?;
        self.auth_db
            .delete_user(user.id)
            .await
            .context("Failed to delete user")?;

        tracing::debug!(user_id = user.id, prompters, "account data removed");
        Ok(())
    }

    /// Update the caller's own account. Only admins may change a role.
    pub async fn update_self(
        &self,
        current: &AuthUser,
        request: &UpdateUserRequest,
    ) -> ApiResult<()> {
        if let Some(role) = non_empty(request.role.as_deref()) {
            if parse_role(role)? != current.role && !current.is_admin() {
                return Err(ApiError::forbidden("No enough permissions"));
            }
        }

        let user = self.load_user(current.user_id).await?;
        self.apply_update(user, request).await
    }

    /// Admin update of any account.
    pub async fn update_by_id(&self, user_id: i64, request: &UpdateUserRequest) -> ApiResult<()> {
        let user = self.load_user(user_id).await?;
        self.apply_update(user, request).await
    }

    async fn apply_update(&self, mut user: User, request: &UpdateUserRequest) -> ApiResult<()> {
        if let Some(username) = non_empty(request.username.as_deref()) {
            if username != user.username
                && self
                    .auth_db
                    .is_username_taken(username, Some(user.id))
                    .await
                    .context("Failed to check username")?
            {
                return Err(ApiError::bad_request("Username already exists"));
            }
            user.username = username.to_string();
        }

        if let Some(email) = non_empty(request.email.as_deref()) {
            if !looks_like_email(email) {
                return Err(ApiError::bad_request("Invalid email"));
            }
            if email != user.email
                && self
                    .auth_db
                    .is_email_taken(email, Some(user.id))
                    .await
                    .context("Failed to check email")?
            {
                return Err(ApiError::bad_request("Email already exists"));
            }
            user.email = email.to_string();
        }

        if let Some(password) = request.password.as_deref().filter(|p| !p.is_empty()) {
            user.password_hash = hash_password(password)?;
        }

        if let Some(role) = non_empty(request.role.as_deref()) {
            user.role = parse_role(role)?;
        }

        self.auth_db.update_user(&user).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::bad_request("Username or Email already exists")
            } else {
                ApiError::Internal(anyhow::Error::new(e).context("Failed to update user"))
            }
        })?;

        tracing::info!(user_id = user.id, "user updated");
        Ok(())
    }

    async fn notify(&self, user_id: i64, kind: NotificationKind, content: &str) {
        if let Err(e) = self
            .db
            .create_notification(user_id, kind.as_str(), content)
            .await
        {
            tracing::warn!(user_id, kind = kind.as_str(), error = %e, "failed to record notification");
        }
    }
}
