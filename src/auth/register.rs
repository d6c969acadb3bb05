use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    forms::RegisterForm,
    include_res,
    res::{self, escape, fill},
    session, AppResult, AppState,
};

pub(crate) const REGISTRATION_FAILED: &str = "An error occurred during registration";

async fn register_form(db_pool: &SqlitePool, session: &Session, form: &RegisterForm) -> AppResult<Response> {
    let body = fill(
        include_res!(str, "/pages/register.html"),
        &[
            ("name", escape(&form.name).as_str()),
            ("username", escape(&form.username).as_str()),
            ("email", escape(&form.email).as_str()),
        ],
    );
    res::page(db_pool, session, "Register", &body).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn register_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    register_form(&db_pool, &session, &RegisterForm::default()).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let created = match form.validate() {
        Ok(registration) => super::create_user(&db_pool, registration).await?,
        Err(e) => Err(e),
    };

    match created {
        Ok(user) => {
            session::log_in(&session, user.id).await?;
            tracing::info!(user_id = %user.id, username = %user.username, "registered");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::debug!(error = %e, "registration rejected");
            session::flash(&session, REGISTRATION_FAILED).await?;
            register_form(&db_pool, &session, &form).await
        }
    }
}
