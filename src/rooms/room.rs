use axum::{debug_handler, extract::{Path, State}, response::{Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    db,
    forms::MessageForm,
    include_res,
    res::{self, escape, fill},
    session::{self, AuthUser},
    AppError, AppResult, AppState,
};

use super::{host_link, msg};

#[debug_handler(state = AppState)]
pub(crate) async fn room(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(room_id): Path<Uuid>,
) -> AppResult<Response> {
    let room = db::rooms::summary(&db_pool, room_id)
        .await?
        .ok_or(AppError::NotFound("room"))?;
    let viewer = session::user_id(&session).await?;

    let messages: String = db::messages::in_room(&db_pool, room_id)
        .await?
        .iter()
        .map(|message| msg::msg_to_html(message, viewer))
        .collect();

    let participants = db::rooms::participants(&db_pool, room_id).await?;
    let participant_items: String = participants
        .iter()
        .map(|p| {
            fill(
                include_res!(str, "/pages/participant.html"),
                &[
                    ("id", p.id.to_string().as_str()),
                    ("avatar", res::avatar_url(&p.avatar).as_str()),
                    ("name", escape(p.name.as_deref().unwrap_or(&p.username)).as_str()),
                    ("username", escape(&p.username).as_str()),
                ],
            )
        })
        .collect();

    let id = room.id.to_string();
    let actions = if viewer.is_some() && viewer == room.host_id {
        fill(include_res!(str, "/pages/room_actions.html"), &[("id", id.as_str())])
    } else {
        String::new()
    };
    let message_form = if viewer.is_some() {
        fill(include_res!(str, "/pages/message_form.html"), &[("id", id.as_str())])
    } else {
        r#"<p><a href="/login">Log in</a> to join the conversation.</p>"#.to_owned()
    };

    let body = fill(
        include_res!(str, "/pages/room.html"),
        &[
            ("actions", actions.as_str()),
            ("name", escape(&room.name).as_str()),
            ("updated", res::ago(room.updated).as_str()),
            ("topic", escape(room.topic_name.as_deref().unwrap_or("")).as_str()),
            ("host", host_link(room.host_id, room.host_username.as_deref()).as_str()),
            ("description", escape(room.description.as_deref().unwrap_or("")).as_str()),
            ("messages", messages.as_str()),
            ("message_form", message_form.as_str()),
            ("participant_count", participants.len().to_string().as_str()),
            ("participants", participant_items.as_str()),
        ],
    );

    res::page(&db_pool, &session, &room.name, &body).await
}

/// Posts to the room as the current user, then redirects back so a reload
/// does not post twice.
#[debug_handler(state = AppState)]
pub(crate) async fn post_message(
    State(db_pool): State<SqlitePool>,
    AuthUser(user_id): AuthUser,
    Path(room_id): Path<Uuid>,
    Form(MessageForm { body }): Form<MessageForm>,
) -> AppResult<Redirect> {
    let room = db::rooms::find(&db_pool, room_id)
        .await?
        .ok_or(AppError::NotFound("room"))?;

    let body = body.trim();
    if !body.is_empty() {
        let id = db::messages::post(&db_pool, room.id, user_id, body).await?;
        tracing::debug!(%id, room_id = %room.id, %user_id, "message posted");
    }

    Ok(Redirect::to(&format!("/room/{}", room.id)))
}
