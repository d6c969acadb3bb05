use axum::{debug_handler, extract::{Path, State}, response::Response};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    db, include_res,
    res::{self, escape, fill},
    rooms, session, topics, AppError, AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = db::users::find(&db_pool, profile_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    let viewer = session::user_id(&session).await?;

    let room_items: String = db::rooms::hosted_by(&db_pool, user.id)
        .await?
        .iter()
        .map(|room| rooms::room_item_html(room, viewer))
        .collect();

    let activity: String = db::messages::by_user(&db_pool, user.id)
        .await?
        .iter()
        .map(|message| rooms::activity_html(message, viewer))
        .collect();

    let topic_items: String = db::topics::search(&db_pool, "", None)
        .await?
        .iter()
        .map(topics::topic_item_html)
        .collect();

    let edit = if viewer == Some(user.id) {
        r#"<a class="button" href="/profile/edit">Edit profile</a>"#
    } else {
        ""
    };

    let body = fill(
        include_res!(str, "/pages/profile.html"),
        &[
            ("topics", topic_items.as_str()),
            ("avatar", res::avatar_url(&user.avatar).as_str()),
            ("name", escape(user.display_name()).as_str()),
            ("username", escape(&user.username).as_str()),
            ("edit", edit),
            ("bio", escape(user.bio.as_deref().unwrap_or("")).as_str()),
            ("rooms", room_items.as_str()),
            ("activity", activity.as_str()),
        ],
    );
    res::page(&db_pool, &session, &user.username, &body).await
}
