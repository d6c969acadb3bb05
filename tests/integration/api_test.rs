use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::helpers::{create_room, TestApp};

#[tokio::test]
async fn should_list_api_routes() {
    let site = TestApp::new().await;
    let response = site.client().get("/api").await;
    response.assert_status_ok();
    response.assert_json(&json!(["GET /api", "GET /api/rooms", "GET /api/rooms/:id"]));
}

#[tokio::test]
async fn should_serialize_rooms_with_participants() {
    let site = TestApp::new().await;
    let (host, host_id) = site.user("host").await;
    create_room(&host, "python", "Python basics", "intro").await;
    let room = site.room_named("Python basics").await;
    host.post(&format!("/room/{}", room.id))
        .form(&[("body", "hello")])
        .await;

    let client = site.client();
    let rooms: Vec<Value> = client.get("/api/rooms").await.json();
    assert_eq!(rooms.len(), 1);

    let one: Value = client.get(&format!("/api/rooms/{}", room.id)).await.json();
    assert_eq!(one, rooms[0]);
    assert_eq!(one["name"], "Python basics");
    assert_eq!(one["description"], "intro");
    assert_eq!(one["host"], json!(host_id));
    assert_eq!(one["participants"], json!([host_id]));
    assert!(one["topic"].is_string());
    assert!(one["created"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn should_answer_missing_room_with_json_error() {
    let site = TestApp::new().await;
    let response = site
        .client()
        .get(&format!("/api/rooms/{}", Uuid::now_v7()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "kind": "NOT_FOUND", "message": "room not found" }));
}
