//! # Preference Store Tests
//!
//! Each test works on its own SQLite file in a temporary directory.

use anyhow::Result;
use pulseforge::db::*;
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup_test_db() -> Result<(TempDir, SqlitePool)> {
    let dir = tempfile::tempdir()?;
    let pool = connect(&dir.path().join("data").join("pulseforge.db")).await?;
    init_database_schema(&pool).await?;
    Ok((dir, pool))
}

#[tokio::test]
async fn test_unknown_chat_gets_empty_preference() -> Result<()> {
    let (_dir, pool) = setup_test_db().await?;

    let pref = get_user_preference(&pool, 42).await;
    assert_eq!(pref, UserPreference::empty(42));
    assert!(fetch_user_preference(&pool, 42).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_save_then_get_returns_record() -> Result<()> {
    let (_dir, pool) = setup_test_db().await?;

    let mut pref = UserPreference::empty(7);
    pref.sport = Some("basketball".to_string());
    pref.region = Some("america".to_string());
    assert!(save_user_preference(&pool, &pref).await);

    let stored = get_user_preference(&pool, 7).await;
    assert_eq!(stored.sport.as_deref(), Some("basketball"));
    assert_eq!(stored.region.as_deref(), Some("america"));
    assert_eq!(stored.country, None);
    assert!(stored.updated_at.is_some());
    Ok(())
}

#[tokio::test]
async fn test_last_write_wins() -> Result<()> {
    let (_dir, pool) = setup_test_db().await?;

    let mut pref = UserPreference::empty(7);
    pref.sport = Some("football".to_string());
    pref.country = Some("spain".to_string());
    save_user_preference(&pool, &pref).await;

    // Read-modify-write, as the menu handlers do
    let mut pref = get_user_preference(&pool, 7).await;
    pref.sport = Some("tennis".to_string());
    pref.league_id = Some("140".to_string());
    save_user_preference(&pool, &pref).await;

    let stored = get_user_preference(&pool, 7).await;
    assert_eq!(stored.sport.as_deref(), Some("tennis"));
    assert_eq!(stored.country.as_deref(), Some("spain"));
    assert_eq!(stored.league_id.as_deref(), Some("140"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE chat_id = 7")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn test_schema_init_is_idempotent() -> Result<()> {
    let (_dir, pool) = setup_test_db().await?;

    init_database_schema(&pool).await?;
    assert!(save_user_preference(&pool, &UserPreference::empty(1)).await);
    Ok(())
}

#[tokio::test]
async fn test_reopening_keeps_data() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("prefs.db");

    {
        let pool = connect(&path).await?;
        init_database_schema(&pool).await?;
        let mut pref = UserPreference::empty(3);
        pref.sport = Some("ice-hockey".to_string());
        save_user_preference(&pool, &pref).await;
        pool.close().await;
    }

    let pool = connect(&path).await?;
    assert_eq!(get_user_preference(&pool, 3).await.sport.as_deref(), Some("ice-hockey"));
    Ok(())
}
