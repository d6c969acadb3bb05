use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    db,
    forms::RoomForm,
    res,
    session::{self, AuthUser},
    AppResult, AppState,
};

use super::{owned_room, room_form_html};

#[debug_handler(state = AppState)]
pub(crate) async fn edit_room_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
    AuthUser(user_id): AuthUser,
    Path(room_id): Path<Uuid>,
) -> AppResult<Response> {
    let room = owned_room(&db_pool, room_id, user_id).await?;
    let form = RoomForm {
        topic: room.topic_name.unwrap_or_default(),
        name: room.name,
        description: room.description.unwrap_or_default(),
    };

    let topics = db::topics::all(&db_pool).await?;
    let body = room_form_html("Update room", &format!("/room/{room_id}/edit"), &form, &topics);
    res::page(&db_pool, &session, "Update room", &body).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_room(
    State(db_pool): State<SqlitePool>,
    session: Session,
    AuthUser(user_id): AuthUser,
    Path(room_id): Path<Uuid>,
    Form(form): Form<RoomForm>,
) -> AppResult<Response> {
    let room = owned_room(&db_pool, room_id, user_id).await?;

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(e) => {
            session::flash(&session, e.to_string()).await?;
            let topics = db::topics::all(&db_pool).await?;
            let body = room_form_html("Update room", &format!("/room/{room_id}/edit"), &form, &topics);
            return res::page(&db_pool, &session, "Update room", &body).await;
        }
    };

    let topic = db::topics::get_or_create(&db_pool, valid.topic).await?;
    db::rooms::update(&db_pool, room.id, topic.id, valid.name, valid.description).await?;
    tracing::info!(room_id = %room.id, host = %user_id, "room updated");

    Ok(Redirect::to("/").into_response())
}
