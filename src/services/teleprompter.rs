// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Teleprompter documents owned by a single user.

use crate::error::{ApiError, ApiResult};
use crate::models::teleprompter::{
    CreateTeleprompter, NewTeleprompter, Teleprompter, UpdateTeleprompterRequest,
};
use crate::services::auth::non_empty;
use crate::services::db::{is_unique_violation, DbClient};
use crate::services::extractor::{self, DocumentKind};
use crate::services::storage::UploadStorage;
use anyhow::Context;

/// A stored upload ready to be sent back to its owner.
pub struct FileDownload {
    pub file_name: String,
    pub data: Vec<u8>,
}

pub struct TeleprompterService {
    db: DbClient,
    storage: UploadStorage,
}

impl TeleprompterService {
    pub fn new(db: DbClient, storage: UploadStorage) -> Self {
        Self { db, storage }
    }

    /// Create a document from pasted content, an uploaded file, or both.
    /// Text extracted from the file replaces the pasted content.
    pub async fn create(&self, user_id: i64, form: CreateTeleprompter) -> ApiResult<i64> {
        let file = form.file.filter(|f| !f.data.is_empty());
        let name = match non_empty(form.name.as_deref()) {
            Some(name) if form.content.is_some() || file.is_some() => name.to_string(),
            _ => return Err(ApiError::bad_request("Invalid request format")),
        };

        if self
            .db
            .get_teleprompter_by_name(&name, user_id)
            .await
            .context("Failed to check prompter name")?
            .is_some()
        {
            return Err(ApiError::bad_request("Prompter already exists"));
        }

        let mut new = NewTeleprompter {
            user_id,
            name,
            description: form.description,
            content: form.content,
            speed: form.speed,
            prompter_type: form.prompter_type,
            language: form.language,
            ..Default::default()
        };

        if let Some(file) = file {
            let key = self
                .storage
                .save(user_id, &file.file_name, &file.data)
                .await?;
            new.file_path = Some(key);

            match DocumentKind::detect(file.content_type.as_deref(), &file.file_name) {
                Some(kind) => match extractor::extract(kind, file.data).await {
                    Ok(text) => {
                        tracing::debug!(chars = text.len(), "extracted prompter content");
                        new.content = Some(text);
                    }
                    Err(e) => tracing::warn!(
                        file_name = %file.file_name,
                        error = %e,
                        "content extraction failed, keeping pasted content"
                    ),
                },
                None => tracing::warn!(
                    file_name = %file.file_name,
                    content_type = ?file.content_type,
                    "unsupported upload type, keeping pasted content"
                ),
            }
            new.file_name = Some(file.file_name);
        }

        match self.db.insert_teleprompter(&new).await {
            Ok(id) => {
                tracing::info!(user_id, prompter_id = id, "teleprompter created");
                Ok(id)
            }
            Err(e) => {
                if let Some(key) = &new.file_path {
                    if let Err(cleanup) = self.storage.delete(key).await {
                        tracing::warn!(error = ?cleanup, "failed to remove orphaned upload");
                    }
                }
                if is_unique_violation(&e) {
                    Err(ApiError::bad_request("Prompter already exists"))
                } else {
                    Err(anyhow::Error::new(e)
                        .context("Failed to save teleprompter")
                        .into())
                }
            }
        }
    }

    /// All documents of a user. An empty list is reported as not found.
    pub async fn list(&self, user_id: i64) -> ApiResult<Vec<Teleprompter>> {
        let prompters = self
            .db
            .list_teleprompters(user_id)
            .await
            .context("Failed to list teleprompters")?;

        if prompters.is_empty() {
            return Err(ApiError::not_found("No prompters found"));
        }
        Ok(prompters)
    }

    pub async fn get(&self, user_id: i64, id: i64) -> ApiResult<Teleprompter> {
        self.db
            .get_teleprompter(id, user_id)
            .await
            .context("Failed to get teleprompter")?
            .ok_or_else(|| ApiError::not_found("Prompter not found"))
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        request: &UpdateTeleprompterRequest,
    ) -> ApiResult<Teleprompter> {
        let mut prompter = self.get(user_id, id).await?;

        if let Some(name) = non_empty(request.name.as_deref()) {
            if name != prompter.name {
                let existing = self
                    .db
                    .get_teleprompter_by_name(name, user_id)
                    .await
                    .context("Failed to check prompter name")?;
                if existing.is_some() {
                    return Err(ApiError::bad_request("Prompter already exists"));
                }
                prompter.name = name.to_string();
            }
        }
        if let Some(description) = &request.description {
            prompter.description = Some(description.clone());
        }
        if let Some(content) = &request.content {
            prompter.content = Some(content.clone());
        }
        if request.speed.is_some() {
            prompter.speed = request.speed;
        }
        if request.prompter_type.is_some() {
            prompter.prompter_type = request.prompter_type;
        }
        if let Some(language) = &request.language {
            prompter.language = Some(language.clone());
        }

        self.db.update_teleprompter(&prompter).await.map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::bad_request("Prompter already exists")
            } else {
                ApiError::Internal(anyhow::Error::new(e).context("Failed to update teleprompter"))
            }
        })?;

        self.get(user_id, id).await
    }

    /// Delete a document and its stored file.
    pub async fn delete(&self, user_id: i64, id: i64) -> ApiResult<()> {
        let prompter = self.get(user_id, id).await?;

        self.db
            .delete_teleprompter(id, user_id)
            .await
            .context("Failed to delete teleprompter")?;

        if let Some(key) = &prompter.file_path {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(prompter_id = id, error = ?e, "failed to remove stored file");
            }
        }

        tracing::info!(user_id, prompter_id = id, "teleprompter deleted");
        Ok(())
    }

    /// The original upload of a document.
    pub async fn download(&self, user_id: i64, id: i64) -> ApiResult<FileDownload> {
        let prompter = self.get(user_id, id).await?;

        let (Some(key), Some(file_name)) = (prompter.file_path, prompter.file_name) else {
            return Err(ApiError::not_found("File not found"));
        };

        let data = self.storage.read(&key).await.map_err(|e| {
            tracing::warn!(prompter_id = id, error = ?e, "stored file unreadable");
            ApiError::not_found("File not found")
        })?;

        Ok(FileDownload { file_name, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use crate::models::teleprompter::UploadedFile;
    use crate::services::auth_db::{AuthDbClient, NewUser};
    use crate::services::db::connect_in_memory;

    async fn setup() -> (TeleprompterService, i64, i64, tempfile::TempDir) {
        let pool = connect_in_memory().await.unwrap();
        let auth_db = AuthDbClient::new(pool.clone());
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let email = format!("{name}@example.com");
            ids.push(
                auth_db
                    .create_user(&NewUser {
                        username: name,
                        email: &email,
                        password_hash: "hash",
                        role: UserRole::User,
                        verified: true,
                        token_hash: None,
                        token_expires_at: None,
                    })
                    .await
                    .unwrap(),
            );
        }
        let uploads = tempfile::tempdir().unwrap();
        let service =
            TeleprompterService::new(DbClient::new(pool), UploadStorage::new(uploads.path()));
        (service, ids[0], ids[1], uploads)
    }

    fn pasted(name: &str, content: &str) -> CreateTeleprompter {
        CreateTeleprompter {
            name: Some(name.to_string()),
            content: Some(content.to_string()),
            speed: Some(3),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_name_and_body() {
        let (service, alice, _, _dir) = setup().await;

        let err = service
            .create(
                alice,
                CreateTeleprompter {
                    name: Some("Empty".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid request format");

        let err = service
            .create(
                alice,
                CreateTeleprompter {
                    content: Some("text".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid request format");
    }

    #[tokio::test]
    async fn test_duplicate_name_per_user() {
        let (service, alice, bob, _dir) = setup().await;
        service.create(alice, pasted("Talk", "one")).await.unwrap();

        let err = service
            .create(alice, pasted("Talk", "two"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Prompter already exists");

        // Another user may reuse the name
        service.create(bob, pasted("Talk", "three")).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_content_replaces_pasted_text() {
        let (service, alice, _, dir) = setup().await;
        let form = CreateTeleprompter {
            file: Some(UploadedFile {
                file_name: "speech.txt".to_string(),
                content_type: Some("text/plain".to_string()),
                data: b"Ladies and\ngentlemen".to_vec(),
            }),
            ..pasted("Speech", "draft")
        };

        let id = service.create(alice, form).await.unwrap();
        let prompter = service.get(alice, id).await.unwrap();
        assert_eq!(prompter.content.as_deref(), Some("Ladies and gentlemen"));
        assert_eq!(prompter.file_name.as_deref(), Some("speech.txt"));

        let key = prompter.file_path.unwrap();
        assert!(key.starts_with(&format!("{alice}/")));
        assert!(dir.path().join(&key).exists());

        let download = service.download(alice, id).await.unwrap();
        assert_eq!(download.file_name, "speech.txt");
        assert_eq!(download.data, b"Ladies and\ngentlemen");
    }

    #[tokio::test]
    async fn test_unsupported_file_keeps_pasted_content() {
        let (service, alice, _, _dir) = setup().await;
        let form = CreateTeleprompter {
            file: Some(UploadedFile {
                file_name: "photo.png".to_string(),
                content_type: Some("image/png".to_string()),
                data: vec![1, 2, 3],
            }),
            ..pasted("Photo", "caption")
        };

        let id = service.create(alice, form).await.unwrap();
        let prompter = service.get(alice, id).await.unwrap();
        assert_eq!(prompter.content.as_deref(), Some("caption"));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_empty_is_not_found() {
        let (service, alice, bob, _dir) = setup().await;
        assert!(matches!(
            service.list(alice).await,
            Err(ApiError::NotFound(_))
        ));

        let id = service.create(alice, pasted("Mine", "x")).await.unwrap();
        assert_eq!(service.list(alice).await.unwrap().len(), 1);
        assert!(service.list(bob).await.is_err());
        assert!(matches!(
            service.get(bob, id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (service, alice, _, _dir) = setup().await;
        let first = service.create(alice, pasted("First", "a")).await.unwrap();
        service.create(alice, pasted("Second", "b")).await.unwrap();

        let err = service
            .update(
                alice,
                first,
                &UpdateTeleprompterRequest {
                    name: Some("Second".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Prompter already exists");

        let updated = service
            .update(
                alice,
                first,
                &UpdateTeleprompterRequest {
                    name: Some("Renamed".to_string()),
                    speed: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.speed, Some(9));
        assert_eq!(updated.content.as_deref(), Some("a"));
        assert!(updated.updated_at.is_some());

        service.delete(alice, first).await.unwrap();
        assert!(matches!(
            service.delete(alice, first).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_download_without_file() {
        let (service, alice, _, _dir) = setup().await;
        let id = service.create(alice, pasted("Plain", "x")).await.unwrap();
        let err = service.download(alice, id).await.err().unwrap();
        assert_eq!(err.to_string(), "File not found");
    }
}
