//! Tests for on-disk database initialization

use ksa_common::db::init::init_database;
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("ksa.db");

    assert!(!db_path.exists());

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing_and_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("ksa.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO video (video_id, title, thumbnail_url) VALUES ('abc123', 'T', 'http://img')")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM video")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
