// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::auth::format_millis;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Teleprompter document record from the database.
#[derive(Debug, Clone)]
pub struct Teleprompter {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub speed: Option<i64>,
    pub prompter_type: Option<i64>,
    pub language: Option<String>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

/// Fields for inserting a teleprompter.
#[derive(Debug, Clone, Default)]
pub struct NewTeleprompter {
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub speed: Option<i64>,
    pub prompter_type: Option<i64>,
    pub language: Option<String>,
}

/// A file part received in a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Parsed `POST /teleprompter/create` form.
#[derive(Debug, Clone, Default)]
pub struct CreateTeleprompter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub speed: Option<i64>,
    pub prompter_type: Option<i64>,
    pub language: Option<String>,
    pub file: Option<UploadedFile>,
}

/// Partial teleprompter update.
#[derive(Debug, Default, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateTeleprompterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub prompter_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Entry of the teleprompter listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeleprompterSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Teleprompter> for TeleprompterSummary {
    fn from(t: &Teleprompter) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            description: t.description.clone(),
        }
    }
}

/// Full teleprompter document. Storage path and owner are not exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeleprompterDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub file_name: Option<String>,
    pub speed: Option<i64>,
    #[serde(rename = "type")]
    pub prompter_type: Option<i64>,
    pub language: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<&Teleprompter> for TeleprompterDetail {
    fn from(t: &Teleprompter) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            description: t.description.clone(),
            content: t.content.clone(),
            file_name: t.file_name.clone(),
            speed: t.speed,
            prompter_type: t.prompter_type,
            language: t.language.clone(),
            created_at: format_millis(t.created_at),
            updated_at: t.updated_at.map(format_millis),
        }
    }
}

/// Response for listing teleprompters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListTeleprompterResponse {
    pub teleprompters: Vec<TeleprompterSummary>,
    pub count: usize,
}

/// Response after creating a teleprompter.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTeleprompterResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}
