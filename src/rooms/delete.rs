use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{db, res, session::AuthUser, AppResult, AppState};

use super::{delete_html, owned_room};

#[debug_handler(state = AppState)]
pub(crate) async fn delete_room_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
    AuthUser(user_id): AuthUser,
    Path(room_id): Path<Uuid>,
) -> AppResult<Response> {
    let room = owned_room(&db_pool, room_id, user_id).await?;
    let body = delete_html(&room.name, &format!("/room/{room_id}"));
    res::page(&db_pool, &session, "Delete room", &body).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_room(
    State(db_pool): State<SqlitePool>,
    AuthUser(user_id): AuthUser,
    Path(room_id): Path<Uuid>,
) -> AppResult<Response> {
    let room = owned_room(&db_pool, room_id, user_id).await?;
    db::rooms::delete(&db_pool, room.id).await?;
    tracing::info!(room_id = %room.id, host = %user_id, "room deleted");
    Ok(Redirect::to("/").into_response())
}
