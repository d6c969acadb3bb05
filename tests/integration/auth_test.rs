use axum::http::StatusCode;

use studybud::db;

use crate::helpers::{assert_redirect, register, TestApp, PASSWORD};

#[tokio::test]
async fn should_not_create_user_when_passwords_differ() {
    let site = TestApp::new().await;
    let client = site.client();

    let page = register(&client, "ada", "analytical", "analytica1").await;
    page.assert_status_ok();
    let text = page.text();
    assert!(text.contains("An error occurred during registration"));
    assert!(text.contains(r#"value="ada@example.com""#));

    let user = db::users::find_by_email(&site.db_pool, "ada@example.com").await.unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn should_not_register_taken_username_twice() {
    let site = TestApp::new().await;
    site.user("ada").await;

    let client = site.client();
    let email = "someone@example.com";
    let page = client
        .post("/register")
        .form(&[
            ("name", ""),
            ("username", "ADA"),
            ("email", email),
            ("password1", PASSWORD),
            ("password2", PASSWORD),
        ])
        .await;
    page.assert_status_ok();
    assert!(page.text().contains("An error occurred during registration"));
    assert!(db::users::find_by_email(&site.db_pool, email).await.unwrap().is_none());
}

#[tokio::test]
async fn should_report_unknown_user_and_wrong_password() {
    let site = TestApp::new().await;
    site.user("ada").await;
    let client = site.client();

    let page = client
        .post("/login")
        .form(&[("email", "nobody@example.com"), ("password", PASSWORD)])
        .await;
    page.assert_status_ok();
    assert!(page.text().contains("User does not exist."));

    let page = client
        .post("/login")
        .form(&[("email", "ada@example.com"), ("password", "wrong password")])
        .await;
    page.assert_status_ok();
    assert!(page.text().contains("Incorrect password."));
}

#[tokio::test]
async fn should_return_to_requested_page_after_login() {
    let site = TestApp::new().await;
    let (ada, _) = site.user("ada").await;
    assert_redirect(&ada.get("/logout").await, "/");

    let response = ada.get("/room/new").await;
    assert_redirect(&response, "/login?return_url=%2Froom%2Fnew");

    ada.get("/login")
        .add_query_param("return_url", "/room/new")
        .await
        .assert_status_ok();
    let response = ada
        .post("/login")
        .form(&[("email", "ADA@example.com"), ("password", PASSWORD)])
        .await;
    assert_redirect(&response, "/room/new");

    ada.get("/room/new").await.assert_status_ok();
}

#[tokio::test]
async fn should_ignore_offsite_return_url() {
    let site = TestApp::new().await;
    let (ada, _) = site.user("ada").await;
    ada.get("/logout").await;

    ada.get("/login")
        .add_query_param("return_url", "https://evil.example")
        .await;
    let response = ada
        .post("/login")
        .form(&[("email", "ada@example.com"), ("password", PASSWORD)])
        .await;
    assert_redirect(&response, "/");
}

#[tokio::test]
async fn should_forget_user_on_logout() {
    let site = TestApp::new().await;
    let (ada, _) = site.user("ada").await;
    ada.get("/room/new").await.assert_status_ok();

    assert_redirect(&ada.get("/logout").await, "/");
    ada.get("/room/new")
        .await
        .assert_status(StatusCode::SEE_OTHER);
}
