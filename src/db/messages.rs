use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::contains_pattern;

const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub body: String,
    pub updated: OffsetDateTime,
    pub created: OffsetDateTime,
}

impl Message {
    pub fn preview(&self) -> &str {
        preview(&self.body)
    }
}

/// A message with its author and room, as feeds show it.
#[derive(Debug, Clone, FromRow)]
pub struct MessageView {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub username: String,
    pub avatar: String,
    pub room_id: Uuid,
    pub room_name: String,
    pub updated: OffsetDateTime,
    pub created: OffsetDateTime,
}

impl MessageView {
    pub fn preview(&self) -> &str {
        preview(&self.body)
    }
}

/// The first 50 characters of a message body.
pub fn preview(body: &str) -> &str {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

const VIEW_SELECT: &str = "SELECT m.id, m.body, m.user_id, u.username, u.avatar,
        m.room_id, r.name AS room_name, m.updated, m.created
    FROM messages m
    JOIN users u ON u.id = m.user_id
    JOIN rooms r ON r.id = m.room_id";

const RECENT_FIRST: &str = "ORDER BY m.updated DESC, m.created DESC, m.id DESC";

/// Stores a message in `room_id` and makes its author a participant of the
/// room, bumping the room to the top of the listings.
pub async fn post(
    db_pool: &SqlitePool,
    room_id: Uuid,
    user_id: Uuid,
    body: &str,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::now_v7();
    let now = OffsetDateTime::now_utc();

    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO messages (id,user_id,room_id,body,updated,created) VALUES (?,?,?,?,?,?)")
        .bind(id)
        .bind(user_id)
        .bind(room_id)
        .bind(body)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT OR IGNORE INTO room_participants (room_id,user_id) VALUES (?,?)")
        .bind(room_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE rooms SET updated=? WHERE id=?")
        .bind(now)
        .bind(room_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(id)
}

pub async fn find(db_pool: &SqlitePool, id: Uuid) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as("SELECT id,user_id,room_id,body,updated,created FROM messages WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn delete(db_pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM messages WHERE id=?")
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}

pub async fn in_room(db_pool: &SqlitePool, room_id: Uuid) -> Result<Vec<MessageView>, sqlx::Error> {
    sqlx::query_as(&format!("{VIEW_SELECT} WHERE m.room_id=? {RECENT_FIRST}"))
        .bind(room_id)
        .fetch_all(db_pool)
        .await
}

pub async fn by_user(db_pool: &SqlitePool, user_id: Uuid) -> Result<Vec<MessageView>, sqlx::Error> {
    sqlx::query_as(&format!("{VIEW_SELECT} WHERE m.user_id=? {RECENT_FIRST}"))
        .bind(user_id)
        .fetch_all(db_pool)
        .await
}

/// Messages in rooms whose topic name contains `q`, ignoring ASCII case.
pub async fn by_topic(db_pool: &SqlitePool, q: &str) -> Result<Vec<MessageView>, sqlx::Error> {
    sqlx::query_as(&format!(
        r"{VIEW_SELECT}
        JOIN topics t ON t.id = r.topic_id
        WHERE t.name LIKE ? ESCAPE '\'
        {RECENT_FIRST}"
    ))
    .bind(contains_pattern(q))
    .fetch_all(db_pool)
    .await
}

pub async fn all(db_pool: &SqlitePool) -> Result<Vec<MessageView>, sqlx::Error> {
    sqlx::query_as(&format!("{VIEW_SELECT} {RECENT_FIRST}"))
        .fetch_all(db_pool)
        .await
}
