//! # Preference Store
//!
//! SQLite-backed key-value table mapping a chat id to the user's menu
//! preferences. Writes are last-write-wins upserts of the full record.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, error, info};

/// Preferences stored per chat
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct UserPreference {
    pub chat_id: i64,
    pub sport: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub league_id: Option<String>,
    pub updated_at: Option<String>,
}

impl UserPreference {
    /// Empty record for a chat that has never chosen anything.
    pub fn empty(chat_id: i64) -> Self {
        Self {
            chat_id,
            ..Default::default()
        }
    }
}

/// Open (creating if missing) the SQLite file at `path`.
///
/// WAL journaling and a busy timeout let several processes share the file
/// on a mounted volume.
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))?;

    info!(path = %path.display(), "Database opened");
    Ok(pool)
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &SqlitePool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            chat_id INTEGER PRIMARY KEY,
            sport TEXT,
            region TEXT,
            country TEXT,
            league_id TEXT,
            updated_at TEXT
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Read the preference record for a chat, if one exists
pub async fn fetch_user_preference(pool: &SqlitePool, chat_id: i64) -> Result<Option<UserPreference>> {
    let pref = sqlx::query_as::<_, UserPreference>(
        "SELECT chat_id, sport, region, country, league_id, updated_at FROM users WHERE chat_id = ?",
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await
    .context("Failed to read user preference")?;

    Ok(pref)
}

/// Insert or replace the full preference record, stamping `updated_at`
pub async fn upsert_user_preference(pool: &SqlitePool, pref: &UserPreference) -> Result<()> {
    let updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (chat_id, sport, region, country, league_id, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(chat_id) DO UPDATE SET
             sport = excluded.sport,
             region = excluded.region,
             country = excluded.country,
             league_id = excluded.league_id,
             updated_at = excluded.updated_at",
    )
    .bind(pref.chat_id)
    .bind(&pref.sport)
    .bind(&pref.region)
    .bind(&pref.country)
    .bind(&pref.league_id)
    .bind(updated_at)
    .execute(pool)
    .await
    .context("Failed to save user preference")?;

    Ok(())
}

/// Preference record for a chat; an empty record when none is stored or the
/// read fails.
pub async fn get_user_preference(pool: &SqlitePool, chat_id: i64) -> UserPreference {
    match fetch_user_preference(pool, chat_id).await {
        Ok(Some(pref)) => pref,
        Ok(None) => {
            debug!(chat_id, "No stored preference");
            UserPreference::empty(chat_id)
        }
        Err(e) => {
            error!(chat_id, error = %e, "Failed to read preference, using empty record");
            UserPreference::empty(chat_id)
        }
    }
}

/// Save the record. A failed write is logged and reported as `false`; it is
/// neither retried nor shown to the user.
pub async fn save_user_preference(pool: &SqlitePool, pref: &UserPreference) -> bool {
    match upsert_user_preference(pool, pref).await {
        Ok(()) => {
            info!(chat_id = pref.chat_id, "Preference saved");
            true
        }
        Err(e) => {
            error!(chat_id = pref.chat_id, error = %e, "Failed to save preference");
            false
        }
    }
}
