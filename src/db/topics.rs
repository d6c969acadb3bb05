use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::contains_pattern;

#[derive(Debug, Clone, FromRow)]
pub struct Topic {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct TopicSummary {
    pub id: Uuid,
    pub name: String,
    pub room_count: i64,
}

/// Looks up a topic by exact name, inserting it first if absent. The UNIQUE
/// constraint on `topics.name` settles concurrent creators on one row.
pub async fn get_or_create(db_pool: &SqlitePool, name: &str) -> Result<Topic, sqlx::Error> {
    sqlx::query("INSERT INTO topics (id,name) VALUES (?,?) ON CONFLICT(name) DO NOTHING")
        .bind(Uuid::now_v7())
        .bind(name)
        .execute(db_pool)
        .await?;

    sqlx::query_as("SELECT id,name FROM topics WHERE name=?")
        .bind(name)
        .fetch_one(db_pool)
        .await
}

pub async fn all(db_pool: &SqlitePool) -> Result<Vec<Topic>, sqlx::Error> {
    sqlx::query_as("SELECT id,name FROM topics ORDER BY id")
        .fetch_all(db_pool)
        .await
}

pub async fn count(db_pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM topics")
        .fetch_one(db_pool)
        .await?;
    Ok(count)
}

/// Topics whose name contains `q` (ASCII case-insensitive), oldest first,
/// each with the number of rooms filed under it.
pub async fn search(
    db_pool: &SqlitePool,
    q: &str,
    limit: Option<i64>,
) -> Result<Vec<TopicSummary>, sqlx::Error> {
    sqlx::query_as(
        r"SELECT t.id, t.name,
            (SELECT COUNT(*) FROM rooms r WHERE r.topic_id = t.id) AS room_count
        FROM topics t
        WHERE t.name LIKE ? ESCAPE '\'
        ORDER BY t.id
        LIMIT ?",
    )
    .bind(contains_pattern(q))
    .bind(limit.unwrap_or(-1))
    .fetch_all(db_pool)
    .await
}
