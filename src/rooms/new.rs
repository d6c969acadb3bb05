use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db,
    forms::RoomForm,
    res,
    session::{self, AuthUser},
    AppResult, AppState,
};

use super::room_form_html;

#[debug_handler(state = AppState)]
pub(crate) async fn new_room_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
    AuthUser(_): AuthUser,
) -> AppResult<Response> {
    let topics = db::topics::all(&db_pool).await?;
    let body = room_form_html("Create room", "/room/new", &RoomForm::default(), &topics);
    res::page(&db_pool, &session, "Create room", &body).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_room(
    State(db_pool): State<SqlitePool>,
    session: Session,
    AuthUser(user_id): AuthUser,
    Form(form): Form<RoomForm>,
) -> AppResult<Response> {
    let room = match form.validate() {
        Ok(room) => room,
        Err(e) => {
            session::flash(&session, e.to_string()).await?;
            let topics = db::topics::all(&db_pool).await?;
            let body = room_form_html("Create room", "/room/new", &form, &topics);
            return res::page(&db_pool, &session, "Create room", &body).await;
        }
    };

    let topic = db::topics::get_or_create(&db_pool, room.topic).await?;
    let room_id = db::rooms::create(&db_pool, user_id, topic.id, room.name, room.description).await?;
    tracing::info!(%room_id, host = %user_id, topic = %topic.name, "room created");

    Ok(Redirect::to("/").into_response())
}
