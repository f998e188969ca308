// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! User notifications and support requests.

use crate::error::{ApiError, ApiResult};
use crate::models::auth::AuthUser;
use crate::models::notification::{CreateSupportRequest, Notification, Severity, SupportLog};
use crate::services::auth::non_empty;
use crate::services::db::{CreateSupportLogParams, DbClient};
use anyhow::Context;

const DEFAULT_SUPPORT_TYPE: &str = "general";

pub struct NotificationService {
    db: DbClient,
}

impl NotificationService {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: i64) -> ApiResult<Vec<Notification>> {
        Ok(self
            .db
            .list_notifications(user_id)
            .await
            .context("Failed to list notifications")?)
    }

    pub async fn dismiss(&self, user_id: i64, id: i64) -> ApiResult<()> {
        let deleted = self
            .db
            .delete_notification(id, user_id)
            .await
            .context("Failed to delete notification")?;

        if !deleted {
            return Err(ApiError::not_found("Notification not found"));
        }
        Ok(())
    }

    /// Record a support request from the session user.
    pub async fn create_support_log(
        &self,
        user: &AuthUser,
        request: &CreateSupportRequest,
    ) -> ApiResult<i64> {
        let subject = request.subject.trim();
        let content = request.content.trim();
        if subject.is_empty() || content.is_empty() {
            return Err(ApiError::bad_request("Subject and content are required"));
        }

        let severity = match non_empty(request.severity.as_deref()) {
            Some(s) => Severity::parse(s).ok_or_else(|| {
                ApiError::bad_request("Severity must be one of low, medium, high, critical")
            })?,
            None => Severity::Low,
        };
        let support_type = non_empty(request.support_type.as_deref()).unwrap_or(DEFAULT_SUPPORT_TYPE);

        let id = self
            .db
            .create_support_log(&CreateSupportLogParams {
                user_id: Some(user.user_id),
                user_email: &user.email,
                subject,
                content,
                support_type,
                severity: severity.as_str(),
            })
            .await
            .context("Failed to save support request")?;

        tracing::info!(
            support_id = id,
            user_id = user.user_id,
            severity = severity.as_str(),
            "support request recorded"
        );
        Ok(id)
    }

    pub async fn list_support_logs(&self) -> ApiResult<Vec<SupportLog>> {
        Ok(self
            .db
            .list_support_logs()
            .await
            .context("Failed to list support requests")?)
    }
}
