use axum::http::StatusCode;

use studybud::{appresult::NOT_ALLOWED, db};

use crate::helpers::{assert_redirect, create_room, TestApp};

#[tokio::test]
async fn should_find_rooms_by_topic_name_and_description() {
    let site = TestApp::new().await;
    let (host, _) = site.user("host").await;
    assert_redirect(&create_room(&host, "python", "Python basics", "intro").await, "/");

    let guest = site.client();
    for q in ["py", "PYTHON", "basics", "INTRO"] {
        let page = guest.get("/").add_query_param("q", q).await;
        page.assert_status_ok();
        assert!(page.text().contains("Python basics"), "q={q} missed the room");
    }

    let page = guest.get("/").add_query_param("q", "java").await;
    assert!(!page.text().contains("Python basics"));
}

#[tokio::test]
async fn should_add_poster_to_participants_exactly_once() {
    let site = TestApp::new().await;
    let (host, _) = site.user("host").await;
    create_room(&host, "python", "Python basics", "intro").await;
    let room = site.room_named("Python basics").await;

    let (student, student_id) = site.user("student").await;
    for body in ["hello", "anyone here?"] {
        let response = student
            .post(&format!("/room/{}", room.id))
            .form(&[("body", body)])
            .await;
        assert_redirect(&response, &format!("/room/{}", room.id));
    }

    let participants = db::rooms::participant_ids(&site.db_pool, room.id).await.unwrap();
    assert_eq!(participants, vec![student_id]);

    let page = student.get(&format!("/room/{}", room.id)).await;
    assert!(page.text().contains("anyone here?"));
}

#[tokio::test]
async fn should_ignore_blank_messages() {
    let site = TestApp::new().await;
    let (host, _) = site.user("host").await;
    create_room(&host, "python", "Python basics", "").await;
    let room = site.room_named("Python basics").await;

    host.post(&format!("/room/{}", room.id))
        .form(&[("body", "   ")])
        .await;

    assert!(db::messages::in_room(&site.db_pool, room.id).await.unwrap().is_empty());
    assert!(db::rooms::participant_ids(&site.db_pool, room.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_refuse_room_changes_by_non_host() {
    let site = TestApp::new().await;
    let (host, _) = site.user("host").await;
    create_room(&host, "python", "Python basics", "intro").await;
    let room = site.room_named("Python basics").await;

    let (intruder, _) = site.user("intruder").await;

    let page = intruder.get(&format!("/room/{}/edit", room.id)).await;
    page.assert_status(StatusCode::FORBIDDEN);
    page.assert_text(NOT_ALLOWED);

    let response = intruder
        .post(&format!("/room/{}/edit", room.id))
        .form(&[("topic", "java"), ("name", "Hijacked"), ("description", "")])
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_text(NOT_ALLOWED);

    let response = intruder.post(&format!("/room/{}/delete", room.id)).await;
    response.assert_status(StatusCode::FORBIDDEN);

    let after = db::rooms::find(&site.db_pool, room.id).await.unwrap().unwrap();
    assert_eq!(after.name, "Python basics");
    assert_eq!(after.description.as_deref(), Some("intro"));
    assert_eq!(after.updated, room.updated);
}

#[tokio::test]
async fn should_let_host_edit_room() {
    let site = TestApp::new().await;
    let (host, _) = site.user("host").await;
    create_room(&host, "python", "Python basics", "intro").await;
    let room = site.room_named("Python basics").await;

    let form = host.get(&format!("/room/{}/edit", room.id)).await;
    form.assert_status_ok();
    assert!(form.text().contains("Python basics"));

    let response = host
        .post(&format!("/room/{}/edit", room.id))
        .form(&[("topic", "rust"), ("name", "Rust basics"), ("description", "ownership")])
        .await;
    assert_redirect(&response, "/");

    let room = site.room_named("Rust basics").await;
    assert_eq!(room.topic_name.as_deref(), Some("rust"));
    assert_eq!(room.description.as_deref(), Some("ownership"));
}

#[tokio::test]
async fn should_delete_messages_with_their_room() {
    let site = TestApp::new().await;
    let (host, _) = site.user("host").await;
    create_room(&host, "python", "Python basics", "intro").await;
    let room = site.room_named("Python basics").await;

    host.post(&format!("/room/{}", room.id))
        .form(&[("body", "first")])
        .await;
    assert_eq!(db::messages::all(&site.db_pool).await.unwrap().len(), 1);

    let response = host.post(&format!("/room/{}/delete", room.id)).await;
    assert_redirect(&response, "/");

    assert!(db::rooms::find(&site.db_pool, room.id).await.unwrap().is_none());
    assert!(db::messages::all(&site.db_pool).await.unwrap().is_empty());

    host.get(&format!("/room/{}", room.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_only_let_authors_delete_messages() {
    let site = TestApp::new().await;
    let (host, _) = site.user("host").await;
    create_room(&host, "python", "Python basics", "").await;
    let room = site.room_named("Python basics").await;
    host.post(&format!("/room/{}", room.id))
        .form(&[("body", "mine")])
        .await;
    let message = db::messages::in_room(&site.db_pool, room.id).await.unwrap().remove(0);

    let (other, _) = site.user("other").await;
    other
        .post(&format!("/message/{}/delete", message.id))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    assert!(db::messages::find(&site.db_pool, message.id).await.unwrap().is_some());

    let response = host.post(&format!("/message/{}/delete", message.id)).await;
    assert_redirect(&response, "/");
    assert!(db::messages::find(&site.db_pool, message.id).await.unwrap().is_none());
}

#[tokio::test]
async fn should_send_anonymous_visitors_to_login() {
    let site = TestApp::new().await;
    let guest = site.client();

    let response = guest.get("/room/new").await;
    assert_redirect(&response, "/login?return_url=%2Froom%2Fnew");
}

#[tokio::test]
async fn should_list_topics_and_activity() {
    let site = TestApp::new().await;
    let (host, _) = site.user("host").await;
    create_room(&host, "python", "Python basics", "").await;
    let room = site.room_named("Python basics").await;
    host.post(&format!("/room/{}", room.id))
        .form(&[("body", "welcome to the room")])
        .await;

    let guest = site.client();
    let topics = guest.get("/topics").add_query_param("q", "PY").await;
    topics.assert_status_ok();
    assert!(topics.text().contains("python"));

    let activity = guest.get("/activity").await;
    activity.assert_status_ok();
    assert!(activity.text().contains("welcome to the room"));
}
