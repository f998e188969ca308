// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::auth::format_millis;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of notification recorded for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    AccountActivated,
    PasswordChanged,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::AccountActivated => "account_activated",
            NotificationKind::PasswordChanged => "password_changed",
        }
    }
}

/// Notification record from the database.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub content: String,
    pub created_at: i64,
}

/// Severity of a support request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

/// Support log record from the database.
#[derive(Debug, Clone)]
pub struct SupportLog {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_email: String,
    pub subject: String,
    pub content: String,
    pub support_type: String,
    pub severity: String,
    pub created_at: i64,
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationInfo {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub created_at: String,
}

impl From<&Notification> for NotificationInfo {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind.clone(),
            content: n.content.clone(),
            created_at: format_millis(n.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListNotificationsResponse {
    pub notifications: Vec<NotificationInfo>,
    pub count: usize,
}

/// Request to open a support ticket.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateSupportRequest {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupportLogInfo {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_email: String,
    pub subject: String,
    pub content: String,
    pub support_type: String,
    pub severity: String,
    pub created_at: String,
}

impl From<&SupportLog> for SupportLogInfo {
    fn from(log: &SupportLog) -> Self {
        Self {
            id: log.id,
            user_id: log.user_id,
            user_email: log.user_email.clone(),
            subject: log.subject.clone(),
            content: log.content.clone(),
            support_type: log.support_type.clone(),
            severity: log.severity.clone(),
            created_at: format_millis(log.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListSupportLogsResponse {
    pub support_logs: Vec<SupportLogInfo>,
    pub count: usize,
}
