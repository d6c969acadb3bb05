use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    db::{self, MessageView},
    include_res,
    res::{self, escape, fill},
    session::AuthUser,
    AppError, AppResult, AppState,
};

use super::delete_html;

fn actions_html(message: &MessageView, viewer: Option<Uuid>) -> String {
    if viewer == Some(message.user_id) {
        fill(
            include_res!(str, "/pages/message_actions.html"),
            &[("id", message.id.to_string().as_str())],
        )
    } else {
        String::new()
    }
}

/// A message as shown inside its room, body rendered as Markdown.
pub(crate) fn msg_to_html(message: &MessageView, viewer: Option<Uuid>) -> String {
    fill(
        include_res!(str, "/pages/message.html"),
        &[
            ("user_id", message.user_id.to_string().as_str()),
            ("avatar", res::avatar_url(&message.avatar).as_str()),
            ("username", escape(&message.username).as_str()),
            ("ago", res::ago(message.created).as_str()),
            ("actions", actions_html(message, viewer).as_str()),
            ("body", res::markdown(&message.body).as_str()),
        ],
    )
}

/// A message as shown in activity feeds: author, room and a short preview.
pub(crate) fn activity_html(message: &MessageView, viewer: Option<Uuid>) -> String {
    fill(
        include_res!(str, "/pages/activity_item.html"),
        &[
            ("user_id", message.user_id.to_string().as_str()),
            ("avatar", res::avatar_url(&message.avatar).as_str()),
            ("username", escape(&message.username).as_str()),
            ("ago", res::ago(message.created).as_str()),
            ("actions", actions_html(message, viewer).as_str()),
            ("room_id", message.room_id.to_string().as_str()),
            ("room_name", escape(&message.room_name).as_str()),
            ("preview", escape(message.preview()).as_str()),
        ],
    )
}

async fn owned_message(db_pool: &SqlitePool, message_id: Uuid, user_id: Uuid) -> AppResult<db::Message> {
    let message = db::messages::find(db_pool, message_id)
        .await?
        .ok_or(AppError::NotFound("message"))?;

    if message.user_id != user_id {
        tracing::warn!(%message_id, %user_id, "message deletion by non-author refused");
        return Err(AppError::NotAllowed);
    }
    Ok(message)
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_message_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
    AuthUser(user_id): AuthUser,
    Path(message_id): Path<Uuid>,
) -> AppResult<Response> {
    let message = owned_message(&db_pool, message_id, user_id).await?;
    let body = delete_html(message.preview(), &format!("/room/{}", message.room_id));
    res::page(&db_pool, &session, "Delete message", &body).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_message(
    State(db_pool): State<SqlitePool>,
    AuthUser(user_id): AuthUser,
    Path(message_id): Path<Uuid>,
) -> AppResult<Response> {
    let message = owned_message(&db_pool, message_id, user_id).await?;
    db::messages::delete(&db_pool, message.id).await?;
    tracing::info!(message_id = %message.id, %user_id, "message deleted");
    Ok(Redirect::to("/").into_response())
}
