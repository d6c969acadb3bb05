use axum::{debug_handler, extract::State, response::Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, include_res, res::{self, fill}, rooms, session, AppResult, AppState};

#[debug_handler(state = AppState)]
pub async fn activity(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let viewer = session::user_id(&session).await?;
    let activity: String = db::messages::all(&db_pool)
        .await?
        .iter()
        .map(|message| rooms::activity_html(message, viewer))
        .collect();

    let body = fill(include_res!(str, "/pages/activity.html"), &[("activity", activity.as_str())]);
    res::page(&db_pool, &session, "Activity", &body).await
}
