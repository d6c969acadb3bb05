//! Read-only JSON view of the rooms.

use axum::{
    debug_handler,
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::{
    db::{self, Room},
    ApiError, AppError, AppState,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

const ROUTES: [&str; 3] = ["GET /api", "GET /api/rooms", "GET /api/rooms/:id"];

#[derive(Debug, Serialize)]
pub struct RoomJson {
    pub id: Uuid,
    pub host: Option<Uuid>,
    pub topic: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub participants: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

impl RoomJson {
    async fn load(db_pool: &SqlitePool, room: Room) -> Result<Self, sqlx::Error> {
        let participants = db::rooms::participant_ids(db_pool, room.id).await?;
        Ok(Self {
            id: room.id,
            host: room.host_id,
            topic: room.topic_id,
            name: room.name,
            description: room.description,
            participants,
            updated: room.updated,
            created: room.created,
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(routes))
        .route("/rooms", get(rooms))
        .route("/rooms/{id}", get(room))
        .layer(CorsLayer::permissive())
}

#[debug_handler]
async fn routes() -> Json<[&'static str; 3]> {
    Json(ROUTES)
}

#[debug_handler(state = AppState)]
async fn rooms(State(db_pool): State<SqlitePool>) -> ApiResult<Vec<RoomJson>> {
    let mut out = Vec::new();
    for room in db::rooms::all(&db_pool).await? {
        out.push(RoomJson::load(&db_pool, room).await?);
    }
    Ok(Json(out))
}

#[debug_handler(state = AppState)]
async fn room(
    Path(room_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> ApiResult<RoomJson> {
    let room = db::rooms::find(&db_pool, room_id)
        .await?
        .ok_or(AppError::NotFound("room"))?;
    Ok(Json(RoomJson::load(&db_pool, room).await?))
}
