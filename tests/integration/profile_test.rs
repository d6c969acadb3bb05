use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use uuid::Uuid;

use studybud::db;

use crate::helpers::{assert_redirect, create_room, TestApp};

const EDIT_BUTTON: &str = r#"class="button" href="/profile/edit""#;

fn profile_form(username: &str, email: &str, bio: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", "Ada Lovelace")
        .add_text("username", username)
        .add_text("email", email)
        .add_text("bio", bio)
}

#[tokio::test]
async fn should_show_hosted_rooms_on_profile() {
    let site = TestApp::new().await;
    let (ada, ada_id) = site.user("ada").await;
    create_room(&ada, "python", "Python basics", "").await;

    let page = site.client().get(&format!("/profile/{ada_id}")).await;
    page.assert_status_ok();
    let text = page.text();
    assert!(text.contains("@ada"));
    assert!(text.contains("Python basics"));
    assert!(!text.contains(EDIT_BUTTON));

    let own = ada.get(&format!("/profile/{ada_id}")).await;
    assert!(own.text().contains(EDIT_BUTTON));

    site.client()
        .get(&format!("/profile/{}", Uuid::now_v7()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

fn png() -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::new_rgb8(4, 4)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn with_avatar(form: MultipartForm, data: Vec<u8>, file_name: &str, mime: &str) -> MultipartForm {
    form.add_part("avatar", Part::bytes(data).file_name(file_name).mime_type(mime))
}

#[tokio::test]
async fn should_update_profile_and_store_avatar() {
    let site = TestApp::new().await;
    let (ada, ada_id) = site.user("ada").await;

    // the stored name follows the decoded format, not the client's name
    let form = with_avatar(
        profile_form("countess", "ada@example.com", "first programmer"),
        png(),
        "me.gif",
        "image/gif",
    );
    let response = ada.post("/profile/edit").multipart(form).await;
    assert_redirect(&response, &format!("/profile/{ada_id}"));

    let user = db::users::find(&site.db_pool, ada_id).await.unwrap().unwrap();
    assert_eq!(user.username, "countess");
    assert_eq!(user.name.as_deref(), Some("Ada Lovelace"));
    assert_eq!(user.bio.as_deref(), Some("first programmer"));
    assert!(user.avatar.ends_with(".png"));
    assert!(site.media_dir().join(&user.avatar).is_file());

    ada.get(&format!("/media/{}", user.avatar))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn should_remove_replaced_avatar() {
    let site = TestApp::new().await;
    let (ada, ada_id) = site.user("ada").await;

    let form = with_avatar(profile_form("ada", "ada@example.com", ""), png(), "one.png", "image/png");
    ada.post("/profile/edit").multipart(form).await;
    let first = db::users::find(&site.db_pool, ada_id).await.unwrap().unwrap().avatar;
    assert!(site.media_dir().join(&first).is_file());

    let form = with_avatar(profile_form("ada", "ada@example.com", ""), png(), "two.png", "image/png");
    ada.post("/profile/edit").multipart(form).await;
    let second = db::users::find(&site.db_pool, ada_id).await.unwrap().unwrap().avatar;

    assert_ne!(first, second);
    assert!(!site.media_dir().join(&first).exists());
    assert!(site.media_dir().join(&second).is_file());

    // a text-only update keeps the current avatar
    ada.post("/profile/edit")
        .multipart(profile_form("ada", "ada@example.com", "bio"))
        .await;
    let kept = db::users::find(&site.db_pool, ada_id).await.unwrap().unwrap().avatar;
    assert_eq!(kept, second);
    assert!(site.media_dir().join(&second).is_file());
}

#[tokio::test]
async fn should_reject_svg_and_non_image_avatars() {
    let site = TestApp::new().await;
    let (ada, ada_id) = site.user("ada").await;

    let script = br#"<svg xmlns="http://www.w3.org/2000/svg"><script>fetch('/room/new',{method:'POST'})</script></svg>"#;
    let uploads = [
        (script.to_vec(), "x.svg", "image/svg+xml"),
        (b"not an image at all".to_vec(), "x.png", "image/png"),
    ];
    for (data, file_name, mime) in uploads {
        let form = with_avatar(profile_form("ada", "ada@example.com", ""), data, file_name, mime);
        let page = ada.post("/profile/edit").multipart(form).await;
        page.assert_status_ok();
        assert!(page.text().contains("avatars must be png, jpeg, gif or webp images"));
    }

    let user = db::users::find(&site.db_pool, ada_id).await.unwrap().unwrap();
    assert_eq!(user.avatar, db::users::DEFAULT_AVATAR);
    assert_eq!(std::fs::read_dir(site.media_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn should_reject_taken_email() {
    let site = TestApp::new().await;
    site.user("grace").await;
    let (ada, ada_id) = site.user("ada").await;

    let page = ada
        .post("/profile/edit")
        .multipart(profile_form("ada", "grace@example.com", ""))
        .await;
    page.assert_status_ok();
    assert!(page.text().contains("a user with that email already exists"));

    let user = db::users::find(&site.db_pool, ada_id).await.unwrap().unwrap();
    assert_eq!(user.email, "ada@example.com");
}
