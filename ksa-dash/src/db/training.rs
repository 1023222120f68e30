//! Training table operations

use crate::services::label_import::TrainingRow;
use ksa_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// Uploaded labeled example
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TrainingExample {
    pub training_id: i64,
    pub comment: String,
    pub sentiment: String,
}

/// Append uploaded rows in one transaction
pub async fn insert_training(pool: &SqlitePool, rows: &[TrainingRow]) -> Result<usize> {
    let mut tx = pool.begin().await?;

    for row in rows {
        sqlx::query("INSERT INTO training (comment, sentiment) VALUES (?, ?)")
            .bind(&row.comment)
            .bind(&row.sentiment)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(rows.len())
}

pub async fn list_training(pool: &SqlitePool) -> Result<Vec<TrainingExample>> {
    let rows = sqlx::query_as::<_, TrainingExample>(
        "SELECT training_id, comment, sentiment FROM training ORDER BY training_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_training(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM training")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
