use axum::{debug_handler, extract::Query, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{session, AppResult};

#[derive(Deserialize)]
pub(crate) struct LogoutQuery {
    pub(crate) return_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn logout(
    Query(LogoutQuery { return_url }): Query<LogoutQuery>,
    session: Session,
) -> AppResult<Redirect> {
    if let Some(user_id) = session::user_id(&session).await? {
        tracing::info!(%user_id, "logged out");
    }
    session.flush().await?;

    let return_url = return_url
        .filter(|url| session::is_local(url))
        .unwrap_or_else(|| "/".to_owned());
    Ok(Redirect::to(&return_url))
}
