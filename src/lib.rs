pub mod activity;
pub mod api;
pub mod appresult;
pub mod auth;
pub mod config;
pub mod db;
pub mod forms;
pub mod index;
pub mod profiles;
pub mod res;
pub mod rooms;
pub mod session;
pub mod topics;

use std::path::PathBuf;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{MemoryStore, SessionManagerLayer};

pub use appresult::{ApiError, AppError, AppResult};

/// Directory uploaded avatars are written to and served from.
#[derive(Debug, Clone)]
pub struct MediaDir(pub PathBuf);

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub media_dir: MediaDir,
}

pub fn app(state: AppState, session_layer: SessionManagerLayer<MemoryStore>) -> Router {
    let media = ServeDir::new(&state.media_dir.0);

    Router::new()
        .route("/", get(index::index))
        .route("/topics", get(topics::topics))
        .route("/activity", get(activity::activity))
        .route("/static/avatar.svg", get(res::default_avatar))
        .merge(auth::router())
        .nest("/room", rooms::router())
        .nest("/message", rooms::message_router())
        .nest("/profile", profiles::router())
        .nest("/api", api::router())
        .nest_service("/media", media)
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
