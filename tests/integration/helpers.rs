use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use sqlx::SqlitePool;
use uuid::Uuid;

use studybud::{app, db, session, AppState, MediaDir};

pub const PASSWORD: &str = "correct horse";

/// One in-memory site. Every client gets its own cookie jar.
pub struct TestApp {
    pub db_pool: SqlitePool,
    state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_pool = db::connect_in_memory().await.unwrap();
        let media_dir = std::env::temp_dir().join(format!("studybud-test-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&media_dir).unwrap();

        let state = AppState {
            db_pool: db_pool.clone(),
            media_dir: MediaDir(media_dir),
        };
        Self { db_pool, state }
    }

    pub fn client(&self) -> TestServer {
        TestServer::builder()
            .save_cookies()
            .build(app(self.state.clone(), session::layer(false, 60)))
            .unwrap()
    }

    pub fn media_dir(&self) -> &std::path::Path {
        &self.state.media_dir.0
    }

    /// A client that registered (and so is logged in) as `username`.
    pub async fn user(&self, username: &str) -> (TestServer, Uuid) {
        let client = self.client();
        let response = register(&client, username, PASSWORD, PASSWORD).await;
        assert_redirect(&response, "/");

        let user = db::users::find_by_email(&self.db_pool, &format!("{username}@example.com"))
            .await
            .unwrap()
            .unwrap();
        (client, user.id)
    }

    pub async fn room_named(&self, name: &str) -> db::RoomSummary {
        db::rooms::search(&self.db_pool, name)
            .await
            .unwrap()
            .into_iter()
            .find(|room| room.name == name)
            .unwrap()
    }
}

pub async fn register(client: &TestServer, username: &str, password1: &str, password2: &str) -> TestResponse {
    let email = format!("{username}@example.com");
    client
        .post("/register")
        .form(&[
            ("name", username),
            ("username", username),
            ("email", email.as_str()),
            ("password1", password1),
            ("password2", password2),
        ])
        .await
}

pub async fn create_room(client: &TestServer, topic: &str, name: &str, description: &str) -> TestResponse {
    client
        .post("/room/new")
        .form(&[("topic", topic), ("name", name), ("description", description)])
        .await
}

pub fn assert_redirect(response: &TestResponse, to: &str) {
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), to);
}
