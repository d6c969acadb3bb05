use axum::{debug_handler, extract::{Query, State}, response::Response};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db, include_res,
    res::{self, fill},
    rooms, session, topics, AppResult, AppState,
};

const HOME_TOPICS: i64 = 4;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Rooms matching `q` by topic, name or description, plus the activity
/// feed of rooms whose topic matches.
#[debug_handler(state = AppState)]
pub async fn index(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> AppResult<Response> {
    let viewer = session::user_id(&session).await?;

    let matching = db::rooms::search(&db_pool, &q).await?;
    let room_items: String = matching
        .iter()
        .map(|room| rooms::room_item_html(room, viewer))
        .collect();

    let topic_items: String = db::topics::search(&db_pool, "", Some(HOME_TOPICS))
        .await?
        .iter()
        .map(topics::topic_item_html)
        .collect();
    let topic_count = db::topics::count(&db_pool).await?;

    let activity: String = db::messages::by_topic(&db_pool, &q)
        .await?
        .iter()
        .map(|message| rooms::activity_html(message, viewer))
        .collect();

    let body = fill(
        include_res!(str, "/pages/home.html"),
        &[
            ("topics", topic_items.as_str()),
            ("topic_count", topic_count.to_string().as_str()),
            ("room_count", matching.len().to_string().as_str()),
            ("rooms", room_items.as_str()),
            ("activity", activity.as_str()),
        ],
    );

    res::page(&db_pool, &session, "Home", &body).await
}
