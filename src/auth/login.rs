use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db,
    forms::LoginForm,
    include_res,
    res::{self, escape, fill},
    session, AppResult, AppState,
};

pub(crate) const INCORRECT_PASSWORD: &str = "Incorrect password.";
pub(crate) const NO_SUCH_USER: &str = "User does not exist.";

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
}

async fn login_form(db_pool: &SqlitePool, session: &Session, email: &str) -> AppResult<Response> {
    let body = fill(
        include_res!(str, "/pages/login.html"),
        &[("email", escape(email).as_str())],
    );
    res::page(db_pool, session, "Login", &body).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn login_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Query(LoginQuery { return_url }): Query<LoginQuery>,
) -> AppResult<Response> {
    if session::user_id(&session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    session::set_return_url(&session, return_url).await?;
    login_form(&db_pool, &session, "").await
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(LoginForm { email, password }): Form<LoginForm>,
) -> AppResult<Response> {
    if session::user_id(&session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let email = email.trim().to_lowercase();
    match db::users::find_by_email(&db_pool, &email).await? {
        Some(user) => {
            if super::verify_password(password, user.password_hash).await? {
                session::log_in(&session, user.id).await?;
                tracing::info!(user_id = %user.id, "logged in");
                let return_url = session::take_return_url(&session).await?;
                return Ok(Redirect::to(&return_url).into_response());
            }
            session::flash(&session, INCORRECT_PASSWORD).await?;
        }
        None => {
            session::flash(&session, NO_SUCH_USER).await?;
        }
    }

    login_form(&db_pool, &session, &email).await
}
