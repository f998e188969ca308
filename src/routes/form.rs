// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Multipart form parsing shared by the upload endpoints.

use crate::error::{ApiError, ApiResult};
use crate::models::teleprompter::{CreateTeleprompter, UploadedFile};
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use std::collections::HashMap;

/// Text fields and the first file part of a multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl FormData {
    /// Read every part. Parts with a file name are files, everything else is text.
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<Self> {
        let mut multipart = multipart.map_err(|e| {
            tracing::debug!(error = %e, "multipart rejected");
            ApiError::bad_request("Invalid request format")
        })?;

        let mut form = FormData::default();
        while let Some(field) = multipart.next_field().await.map_err(invalid_part)? {
            let name = field.name().unwrap_or_default().to_string();

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(invalid_part)?;
                if form.file.is_none() && !file_name.is_empty() {
                    form.file = Some(UploadedFile {
                        file_name,
                        content_type,
                        data: data.to_vec(),
                    });
                }
                continue;
            }

            let value = field.text().await.map_err(invalid_part)?;
            form.fields.insert(name, value);
        }

        Ok(form)
    }

    /// A text field, trimmed; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// First present field among `names`.
    pub fn text_any(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| self.text(name))
    }

    /// An optional integer field. Present but non-numeric values are rejected.
    pub fn integer(&self, name: &str) -> ApiResult<Option<i64>> {
        self.text(name)
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|_| ApiError::bad_request("Invalid request format"))
            })
            .transpose()
    }

    /// The fields of `POST /teleprompter/create`.
    pub fn into_create_teleprompter(self) -> ApiResult<CreateTeleprompter> {
        Ok(CreateTeleprompter {
            name: self.text("name"),
            description: self.text("description"),
            content: self.text("content"),
            speed: self.integer("speed")?,
            prompter_type: self.integer("type")?,
            language: self.text("language"),
            file: self.file,
        })
    }
}

fn invalid_part(err: MultipartError) -> ApiError {
    tracing::info!(status = %err.status(), error = %err.body_text(), "multipart part rejected");
    part_error(err.status())
}

fn part_error(status: StatusCode) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("File too large".to_string())
    } else {
        ApiError::bad_request("Invalid request format")
    }
}
