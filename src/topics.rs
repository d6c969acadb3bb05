use axum::{debug_handler, extract::{Query, State}, response::Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db::{self, TopicSummary},
    include_res,
    index::SearchQuery,
    res::{self, escape, fill, url_encode},
    AppResult, AppState,
};

pub(crate) fn topic_item_html(topic: &TopicSummary) -> String {
    fill(
        include_res!(str, "/pages/topic_item.html"),
        &[
            ("q", url_encode(&topic.name).as_str()),
            ("name", escape(&topic.name).as_str()),
            ("room_count", topic.room_count.to_string().as_str()),
        ],
    )
}

#[debug_handler(state = AppState)]
pub async fn topics(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> AppResult<Response> {
    let topic_items: String = db::topics::search(&db_pool, &q, None)
        .await?
        .iter()
        .map(topic_item_html)
        .collect();

    let body = fill(
        include_res!(str, "/pages/topics.html"),
        &[("q", escape(&q).as_str()), ("topics", topic_items.as_str())],
    );
    res::page(&db_pool, &session, "Topics", &body).await
}
