// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Local filesystem storage for uploaded teleprompter files.

use anyhow::{anyhow, Context, Result};
use std::path::{Component, Path, PathBuf};

const MAX_FILE_NAME_LEN: usize = 100;

/// Stores uploads under `<root>/<user_id>/<millis>_<file name>`.
/// Keys handed out and accepted are relative to the root.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write an upload and return its storage key.
    pub async fn save(&self, user_id: i64, file_name: &str, data: &[u8]) -> Result<String> {
        let dir = self.root.join(user_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;

        let stored_name = format!(
            "{}_{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_file_name(file_name)
        );
        let key = format!("{}/{}", user_id, stored_name);

        tokio::fs::write(dir.join(&stored_name), data)
            .await
            .with_context(|| format!("Failed to write upload {}", key))?;

        tracing::debug!(key = %key, bytes = data.len(), "stored upload");
        Ok(key)
    }

    pub async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read upload {}", key))
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete upload {}", key)),
        }
    }

    /// Remove every upload of a user.
    pub async fn remove_user_dir(&self, user_id: i64) -> Result<()> {
        let dir = self.root.join(user_id.to_string());
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove upload directory {}", dir.display())),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !is_plain {
            return Err(anyhow!("Invalid storage key: {}", key));
        }
        Ok(self.root.join(relative))
    }
}

/// Reduce a client-supplied name to a safe single path segment.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return "upload".to_string();
    }

    // Keep the tail so the extension survives truncation
    let skip = cleaned.len().saturating_sub(MAX_FILE_NAME_LEN);
    cleaned[skip..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("speech.pdf"), "speech.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\my talk.docx"), "my_talk.docx");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("..."), "upload");
    }

    #[test]
    fn test_sanitize_keeps_extension_when_truncating() {
        let long = format!("{}.txt", "a".repeat(300));
        let cleaned = sanitize_file_name(&long);
        assert_eq!(cleaned.len(), MAX_FILE_NAME_LEN);
        assert!(cleaned.ends_with(".txt"));
    }

    #[tokio::test]
    async fn test_save_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path());

        let key = storage.save(42, "notes.txt", b"hello").await.unwrap();
        assert!(key.starts_with("42/"));
        assert!(key.ends_with("_notes.txt"));
        assert_eq!(storage.read(&key).await.unwrap(), b"hello");

        storage.delete(&key).await.unwrap();
        assert!(storage.read(&key).await.is_err());
        // Deleting twice is fine
        storage.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_user_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path());

        storage.save(7, "a.txt", b"a").await.unwrap();
        storage.save(7, "b.txt", b"b").await.unwrap();
        storage.remove_user_dir(7).await.unwrap();
        assert!(!dir.path().join("7").exists());

        // Missing directory is not an error
        storage.remove_user_dir(8).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = UploadStorage::new(dir.path());
        assert!(storage.read("../secret").await.is_err());
        assert!(storage.read("/etc/passwd").await.is_err());
        assert!(storage.delete("").await.is_err());
    }
}
