//! Preprocessed training and test text
//!
//! Both tables are derived data. Writers replace a whole slice in one
//! transaction: the full `preprocessed_training` table, or one video's rows
//! of `preprocessed_test`.

use ksa_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PreprocessedTraining {
    pub id: i64,
    pub text: String,
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PreprocessedTest {
    pub id: i64,
    pub text: String,
    pub video_id: String,
}

pub async fn count_preprocessed_training(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM preprocessed_training")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn list_preprocessed_training(pool: &SqlitePool) -> Result<Vec<PreprocessedTraining>> {
    let rows = sqlx::query_as::<_, PreprocessedTraining>(
        "SELECT id, text, sentiment FROM preprocessed_training ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Write `(text, sentiment)` rows, first clearing the table when `clear` is set
pub async fn store_preprocessed_training(
    pool: &SqlitePool,
    rows: &[(String, String)],
    clear: bool,
) -> Result<usize> {
    let mut tx = pool.begin().await?;

    if clear {
        sqlx::query("DELETE FROM preprocessed_training")
            .execute(&mut *tx)
            .await?;
    }

    for (text, sentiment) in rows {
        sqlx::query("INSERT INTO preprocessed_training (text, sentiment) VALUES (?, ?)")
            .bind(text)
            .bind(sentiment)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(rows.len())
}

pub async fn count_preprocessed_test(pool: &SqlitePool, video_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM preprocessed_test WHERE video_id = ?")
        .bind(video_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn list_preprocessed_test(pool: &SqlitePool, video_id: &str) -> Result<Vec<PreprocessedTest>> {
    let rows = sqlx::query_as::<_, PreprocessedTest>(
        "SELECT id, text, video_id FROM preprocessed_test WHERE video_id = ? ORDER BY id",
    )
    .bind(video_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Write cleaned texts for one video, first clearing its rows when `clear` is set
pub async fn store_preprocessed_test(
    pool: &SqlitePool,
    video_id: &str,
    texts: &[String],
    clear: bool,
) -> Result<usize> {
    let mut tx = pool.begin().await?;

    if clear {
        sqlx::query("DELETE FROM preprocessed_test WHERE video_id = ?")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
    }

    for text in texts {
        sqlx::query("INSERT INTO preprocessed_test (text, video_id) VALUES (?, ?)")
            .bind(text)
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(texts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::videos::upsert_video;
    use ksa_common::db::init_memory_database;

    #[tokio::test]
    async fn test_training_store_and_clear() {
        let pool = init_memory_database().await.unwrap();
        let rows = vec![("bagus".to_string(), "positif".to_string())];

        store_preprocessed_training(&pool, &rows, false).await.unwrap();
        store_preprocessed_training(&pool, &rows, false).await.unwrap();
        assert_eq!(count_preprocessed_training(&pool).await.unwrap(), 2);

        store_preprocessed_training(&pool, &rows, true).await.unwrap();
        assert_eq!(count_preprocessed_training(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_test_rows_scoped_per_video() {
        let pool = init_memory_database().await.unwrap();
        upsert_video(&pool, "a", "A", "http://img").await.unwrap();
        upsert_video(&pool, "b", "B", "http://img").await.unwrap();

        store_preprocessed_test(&pool, "a", &["satu".into(), "dua".into()], false)
            .await
            .unwrap();
        store_preprocessed_test(&pool, "b", &["tiga".into()], false)
            .await
            .unwrap();
        store_preprocessed_test(&pool, "a", &["empat".into()], true)
            .await
            .unwrap();

        assert_eq!(count_preprocessed_test(&pool, "a").await.unwrap(), 1);
        assert_eq!(count_preprocessed_test(&pool, "b").await.unwrap(), 1);
        let rows = list_preprocessed_test(&pool, "a").await.unwrap();
        assert_eq!(rows[0].text, "empat");
    }
}
