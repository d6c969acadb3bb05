use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::contains_pattern;

#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub id: Uuid,
    pub host_id: Option<Uuid>,
    pub topic_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub updated: OffsetDateTime,
    pub created: OffsetDateTime,
}

/// A room joined with what its listings show: host, topic and head count.
#[derive(Debug, Clone, FromRow)]
pub struct RoomSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub host_id: Option<Uuid>,
    pub host_username: Option<String>,
    pub topic_name: Option<String>,
    pub participant_count: i64,
    pub updated: OffsetDateTime,
    pub created: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Participant {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub avatar: String,
}

const SUMMARY_SELECT: &str = r"SELECT r.id, r.name, r.description, r.host_id,
        u.username AS host_username,
        t.name AS topic_name,
        (SELECT COUNT(*) FROM room_participants p WHERE p.room_id = r.id) AS participant_count,
        r.updated, r.created
    FROM rooms r
    LEFT JOIN topics t ON t.id = r.topic_id
    LEFT JOIN users u ON u.id = r.host_id";

const RECENT_FIRST: &str = "ORDER BY r.updated DESC, r.created DESC, r.id DESC";

pub async fn create(
    db_pool: &SqlitePool,
    host_id: Uuid,
    topic_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::now_v7();
    let now = OffsetDateTime::now_utc();
    sqlx::query("INSERT INTO rooms (id,host_id,topic_id,name,description,updated,created) VALUES (?,?,?,?,?,?,?)")
        .bind(id)
        .bind(host_id)
        .bind(topic_id)
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(db_pool)
        .await?;
    Ok(id)
}

pub async fn find(db_pool: &SqlitePool, id: Uuid) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as("SELECT id,host_id,topic_id,name,description,updated,created FROM rooms WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn summary(db_pool: &SqlitePool, id: Uuid) -> Result<Option<RoomSummary>, sqlx::Error> {
    sqlx::query_as(&format!("{SUMMARY_SELECT} WHERE r.id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn all(db_pool: &SqlitePool) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT r.id,r.host_id,r.topic_id,r.name,r.description,r.updated,r.created FROM rooms r {RECENT_FIRST}"
    ))
    .fetch_all(db_pool)
    .await
}

/// Rooms whose topic name, name or description contains `q`, ignoring ASCII
/// case.
pub async fn search(db_pool: &SqlitePool, q: &str) -> Result<Vec<RoomSummary>, sqlx::Error> {
    let pattern = contains_pattern(q);
    sqlx::query_as(&format!(
        r"{SUMMARY_SELECT}
        WHERE t.name LIKE ? ESCAPE '\'
            OR r.name LIKE ? ESCAPE '\'
            OR r.description LIKE ? ESCAPE '\'
        {RECENT_FIRST}"
    ))
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(db_pool)
    .await
}

pub async fn hosted_by(db_pool: &SqlitePool, user_id: Uuid) -> Result<Vec<RoomSummary>, sqlx::Error> {
    sqlx::query_as(&format!("{SUMMARY_SELECT} WHERE r.host_id=? {RECENT_FIRST}"))
        .bind(user_id)
        .fetch_all(db_pool)
        .await
}

pub async fn update(
    db_pool: &SqlitePool,
    id: Uuid,
    topic_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE rooms SET topic_id=?, name=?, description=?, updated=? WHERE id=?")
        .bind(topic_id)
        .bind(name)
        .bind(description)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}

/// Deletes the room; its messages and participant rows go with it.
pub async fn delete(db_pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM rooms WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}

pub async fn participants(db_pool: &SqlitePool, room_id: Uuid) -> Result<Vec<Participant>, sqlx::Error> {
    sqlx::query_as(
        "SELECT u.id, u.username, u.name, u.avatar
        FROM room_participants p
        JOIN users u ON u.id = p.user_id
        WHERE p.room_id=?
        ORDER BY u.username",
    )
    .bind(room_id)
    .fetch_all(db_pool)
    .await
}

pub async fn participant_ids(db_pool: &SqlitePool, room_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT user_id FROM room_participants WHERE room_id=? ORDER BY user_id")
        .bind(room_id)
        .fetch_all(db_pool)
        .await?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}
