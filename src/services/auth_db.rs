// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Database operations for users and sessions.

use crate::models::auth::{Session, User, UserRole};
use sqlx::SqlitePool;

/// Parameters for inserting a user.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
    pub verified: bool,
    pub token_hash: Option<&'a str>,
    pub token_expires_at: Option<i64>,
}

/// Parameters for creating a session.
pub struct CreateSessionParams<'a> {
    pub session_id_hash: &'a str,
    pub user_id: i64,
    pub expires_at: i64,
    pub user_agent: Option<&'a str>,
    pub ip_address: Option<&'a str>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: i64,
    updated_at: Option<i64>,
    last_login_at: Option<i64>,
    verified: bool,
    token_hash: Option<String>,
    token_expires_at: Option<i64>,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = UserRole::parse(&row.role).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: format!("unknown role '{}'", row.role).into(),
        })?;

        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login_at: row.last_login_at,
            verified: row.verified,
            token_hash: row.token_hash,
            token_expires_at: row.token_expires_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    user_id: i64,
    created_at: i64,
    expires_at: i64,
    last_active_at: i64,
    user_agent: Option<String>,
    ip_address: Option<String>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            user_id: row.user_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
            last_active_at: row.last_active_at,
            user_agent: row.user_agent,
            ip_address: row.ip_address,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at, \
     last_login_at, verified, token_hash, token_expires_at";

/// Database client for authentication data.
#[derive(Clone)]
pub struct AuthDbClient {
    pool: SqlitePool,
}

impl AuthDbClient {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_user<T>(&self, filter: &str, value: T) -> Result<Option<User>, sqlx::Error>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite> + Send + 'static,
    {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter} = ? LIMIT 1");

        sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    // ========== User Operations ==========

    /// Insert a user and return the new id.
    pub async fn create_user(&self, user: &NewUser<'_>) -> Result<i64, sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            "INSERT INTO users
             (username, email, password_hash, role, created_at, verified, token_hash, token_expires_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role.as_str())
        .bind(now)
        .bind(user.verified)
        .bind(user.token_hash)
        .bind(user.token_expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        self.fetch_user("id", user_id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        self.fetch_user("username", username.to_string()).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.fetch_user("email", email.to_string()).await
    }

    /// Find the user holding an outstanding code with this hash.
    pub async fn get_user_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        self.fetch_user("token_hash", token_hash.to_string()).await
    }

    /// List all users ordered by id.
    pub async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");

        sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    /// Check if another user (not `exclude_id`) already has this username.
    pub async fn is_username_taken(
        &self,
        username: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? AND id != ?")
                .bind(username)
                .bind(exclude_id.unwrap_or(-1))
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Check if another user (not `exclude_id`) already has this email.
    pub async fn is_email_taken(
        &self,
        email: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ? AND id != ?")
                .bind(email)
                .bind(exclude_id.unwrap_or(-1))
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Save every mutable column of `user` and stamp `updated_at`.
    pub async fn update_user(&self, user: &User) -> Result<(), sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();

        sqlx::query(
            "UPDATE users
             SET username = ?, email = ?, password_hash = ?, role = ?, updated_at = ?,
                 verified = ?, token_hash = ?, token_expires_at = ?
             WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now)
        .bind(user.verified)
        .bind(&user.token_hash)
        .bind(user.token_expires_at)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Update user's last login time.
    pub async fn update_user_last_login(&self, user_id: i64) -> Result<(), sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();

        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete unverified users whose code expired before `now`. Returns the number removed.
    pub async fn delete_expired_unverified_users(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM users
             WHERE verified = FALSE AND token_expires_at IS NOT NULL AND token_expires_at < ?",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // ========== Session Operations ==========

    pub async fn create_session(&self, params: &CreateSessionParams<'_>) -> Result<(), sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();

        sqlx::query(
            "INSERT INTO sessions
             (session_id, user_id, created_at, expires_at, last_active_at, user_agent, ip_address)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(params.session_id_hash)
        .bind(params.user_id)
        .bind(now)
        .bind(params.expires_at)
        .bind(now)
        .bind(params.user_agent)
        .bind(params.ip_address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_session(&self, session_id_hash: &str) -> Result<Option<Session>, sqlx::Error> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT session_id, user_id, created_at, expires_at, last_active_at, user_agent, ip_address
             FROM sessions WHERE session_id = ?",
        )
        .bind(session_id_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Session::from))
    }

    /// Update session's last active time.
    pub async fn touch_session(&self, session_id_hash: &str) -> Result<(), sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();

        sqlx::query("UPDATE sessions SET last_active_at = ? WHERE session_id = ?")
            .bind(now)
            .bind(session_id_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_session(&self, session_id_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete all sessions for a user (sign out everywhere).
    pub async fn delete_user_sessions(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_expired_sessions(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
