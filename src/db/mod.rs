//! Persistence for users, topics, rooms and messages.
//!
//! Ordering and cascade rules live in `migrations/`; every list query here
//! orders by `updated DESC, created DESC` to match them.

pub mod messages;
pub mod rooms;
pub mod topics;
pub mod users;

use std::str::FromStr;

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

pub use messages::{Message, MessageView};
pub use rooms::{Participant, Room, RoomSummary};
pub use topics::{Topic, TopicSummary};
pub use users::{NewUser, ProfileUpdate, User};

pub static MIGRATOR: Migrator = sqlx::migrate!();

pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&db_pool).await?;
    Ok(db_pool)
}

/// A migrated private in-memory database. Every connection to `:memory:`
/// opens its own database, so the pool is pinned to one connection that
/// never expires.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&db_pool).await?;
    Ok(db_pool)
}

/// `LIKE` pattern matching `q` anywhere in a column, with `%`, `_` and `\`
/// taken literally. Use with `ESCAPE '\'`.
pub fn contains_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}
