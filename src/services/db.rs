// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! SQLite pool setup and queries for teleprompters, notifications and support logs.

use crate::models::notification::{Notification, SupportLog};
use crate::models::teleprompter::{NewTeleprompter, Teleprompter};
use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open the database at `database_url`, creating the file if needed, and apply migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL: {database_url}"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .context("Failed to open SQLite database")?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied.
///
/// The connection is never recycled: dropping it would discard the database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("Failed to open in-memory database")?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct TeleprompterRow {
    id: i64,
    user_id: i64,
    name: String,
    description: Option<String>,
    content: Option<String>,
    file_name: Option<String>,
    file_path: Option<String>,
    speed: Option<i64>,
    #[sqlx(rename = "type")]
    prompter_type: Option<i64>,
    language: Option<String>,
    created_at: i64,
    updated_at: Option<i64>,
}

impl From<TeleprompterRow> for Teleprompter {
    fn from(row: TeleprompterRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            content: row.content,
            file_name: row.file_name,
            file_path: row.file_path,
            speed: row.speed,
            prompter_type: row.prompter_type,
            language: row.language,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    content: String,
    created_at: i64,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SupportLogRow {
    id: i64,
    user_id: Option<i64>,
    user_email: String,
    subject: String,
    content: String,
    support_type: String,
    severity: String,
    created_at: i64,
}

impl From<SupportLogRow> for SupportLog {
    fn from(row: SupportLogRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user_email: row.user_email,
            subject: row.subject,
            content: row.content,
            support_type: row.support_type,
            severity: row.severity,
            created_at: row.created_at,
        }
    }
}

/// Parameters for recording a support request.
pub struct CreateSupportLogParams<'a> {
    pub user_id: Option<i64>,
    pub user_email: &'a str,
    pub subject: &'a str,
    pub content: &'a str,
    pub support_type: &'a str,
    pub severity: &'a str,
}

const TELEPROMPTER_COLUMNS: &str = "id, user_id, name, description, content, file_name, file_path, \
     speed, type, language, created_at, updated_at";

/// Database client for document data.
#[derive(Clone)]
pub struct DbClient {
    pool: SqlitePool,
}

impl DbClient {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========== Teleprompter Operations ==========

    /// Insert a teleprompter and return its id.
    pub async fn insert_teleprompter(&self, new: &NewTeleprompter) -> Result<i64, sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            "INSERT INTO teleprompters
             (user_id, name, description, content, file_name, file_path, speed, type, language, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new.user_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.content)
        .bind(&new.file_name)
        .bind(&new.file_path)
        .bind(new.speed)
        .bind(new.prompter_type)
        .bind(&new.language)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get a teleprompter owned by `user_id`.
    pub async fn get_teleprompter(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Teleprompter>, sqlx::Error> {
        let query =
            format!("SELECT {TELEPROMPTER_COLUMNS} FROM teleprompters WHERE id = ? AND user_id = ?");

        let row = sqlx::query_as::<_, TeleprompterRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Teleprompter::from))
    }

    /// Find a user's teleprompter by name.
    pub async fn get_teleprompter_by_name(
        &self,
        name: &str,
        user_id: i64,
    ) -> Result<Option<Teleprompter>, sqlx::Error> {
        let query = format!(
            "SELECT {TELEPROMPTER_COLUMNS} FROM teleprompters WHERE name = ? AND user_id = ?"
        );

        let row = sqlx::query_as::<_, TeleprompterRow>(&query)
            .bind(name)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Teleprompter::from))
    }

    /// List a user's teleprompters, oldest first.
    pub async fn list_teleprompters(&self, user_id: i64) -> Result<Vec<Teleprompter>, sqlx::Error> {
        let query =
            format!("SELECT {TELEPROMPTER_COLUMNS} FROM teleprompters WHERE user_id = ? ORDER BY id");

        let rows = sqlx::query_as::<_, TeleprompterRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Teleprompter::from).collect())
    }

    /// Persist the editable fields of a teleprompter.
    pub async fn update_teleprompter(&self, prompter: &Teleprompter) -> Result<(), sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();

        sqlx::query(
            "UPDATE teleprompters
             SET name = ?, description = ?, content = ?, speed = ?, type = ?, language = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&prompter.name)
        .bind(&prompter.description)
        .bind(&prompter.content)
        .bind(prompter.speed)
        .bind(prompter.prompter_type)
        .bind(&prompter.language)
        .bind(now)
        .bind(prompter.id)
        .bind(prompter.user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a teleprompter. Returns false if it did not exist.
    pub async fn delete_teleprompter(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teleprompters WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every teleprompter of a user. Returns the number removed.
    pub async fn delete_user_teleprompters(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teleprompters WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // ========== Notification Operations ==========

    pub async fn create_notification(
        &self,
        user_id: i64,
        kind: &str,
        content: &str,
    ) -> Result<i64, sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            "INSERT INTO notifications (user_id, type, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(kind)
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// List a user's notifications, newest first.
    pub async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>, sqlx::Error> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, user_id, type, content, created_at
             FROM notifications WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    pub async fn delete_notification(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_user_notifications(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // ========== Support Log Operations ==========

    pub async fn create_support_log(
        &self,
        params: &CreateSupportLogParams<'_>,
    ) -> Result<i64, sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            "INSERT INTO support_logs
             (user_id, user_email, subject, content, support_type, severity, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(params.user_id)
        .bind(params.user_email)
        .bind(params.subject)
        .bind(params.content)
        .bind(params.support_type)
        .bind(params.severity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// List all support logs, newest first.
    pub async fn list_support_logs(&self) -> Result<Vec<SupportLog>, sqlx::Error> {
        let rows = sqlx::query_as::<_, SupportLogRow>(
            "SELECT id, user_id, user_email, subject, content, support_type, severity, created_at
             FROM support_logs ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SupportLog::from).collect())
    }
}

/// Check whether a database error is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
