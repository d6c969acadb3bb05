mod delete;
mod edit;
mod msg;
mod new;
mod room;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{self, RoomSummary, Topic},
    forms::RoomForm,
    include_res,
    res::{self, escape, fill},
    AppError, AppResult, AppState,
};

pub(crate) use msg::activity_html;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", get(new::new_room_page).post(new::new_room))
        .route("/{id}", get(room::room).post(room::post_message))
        .route("/{id}/edit", get(edit::edit_room_page).post(edit::edit_room))
        .route("/{id}/delete", get(delete::delete_room_page).post(delete::delete_room))
}

pub fn message_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/delete", get(msg::delete_message_page).post(msg::delete_message))
}

/// Fetches a room that `user_id` hosts.
async fn owned_room(db_pool: &SqlitePool, room_id: Uuid, user_id: Uuid) -> AppResult<RoomSummary> {
    let room = db::rooms::summary(db_pool, room_id)
        .await?
        .ok_or(AppError::NotFound("room"))?;

    if room.host_id != Some(user_id) {
        tracing::warn!(%room_id, %user_id, "room change by non-host refused");
        return Err(AppError::NotAllowed);
    }
    Ok(room)
}

pub(crate) fn host_link(host_id: Option<Uuid>, username: Option<&str>) -> String {
    match (host_id, username) {
        (Some(id), Some(username)) => {
            format!(r#"<a href="/profile/{id}">@{}</a>"#, escape(username))
        }
        _ => "deleted user".to_owned(),
    }
}

pub(crate) fn room_item_html(room: &RoomSummary, viewer: Option<Uuid>) -> String {
    let id = room.id.to_string();
    let actions = if viewer.is_some() && viewer == room.host_id {
        fill(include_res!(str, "/pages/room_actions.html"), &[("id", id.as_str())])
    } else {
        String::new()
    };

    fill(
        include_res!(str, "/pages/room_item.html"),
        &[
            ("id", id.as_str()),
            ("host", host_link(room.host_id, room.host_username.as_deref()).as_str()),
            ("updated", res::ago(room.updated).as_str()),
            ("actions", actions.as_str()),
            ("name", escape(&room.name).as_str()),
            ("participant_count", room.participant_count.to_string().as_str()),
            ("topic", escape(room.topic_name.as_deref().unwrap_or("")).as_str()),
        ],
    )
}

fn room_form_html(heading: &str, action: &str, form: &RoomForm, topics: &[Topic]) -> String {
    let topic_options: String = topics
        .iter()
        .map(|topic| format!(r#"<option value="{}"></option>"#, escape(&topic.name)))
        .collect();

    fill(
        include_res!(str, "/pages/room_form.html"),
        &[
            ("heading", heading),
            ("action", action),
            ("topic", escape(&form.topic).as_str()),
            ("topic_options", topic_options.as_str()),
            ("name", escape(&form.name).as_str()),
            ("description", escape(&form.description).as_str()),
        ],
    )
}

fn delete_html(obj: &str, back: &str) -> String {
    fill(
        include_res!(str, "/pages/delete.html"),
        &[("obj", escape(obj).as_str()), ("back", back)],
    )
}
