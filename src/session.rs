use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use crate::{res, AppResult};

pub const USER_ID: &str = "user_id";
pub const RETURN_URL: &str = "return_url";
pub const FLASH: &str = "flash";

pub fn layer(secure: bool, idle_minutes: i64) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(idle_minutes)))
}

pub async fn user_id(session: &Session) -> AppResult<Option<Uuid>> {
    Ok(session.get::<Uuid>(USER_ID).await?)
}

/// Starts an authenticated session under a fresh session id.
pub async fn log_in(session: &Session, user_id: Uuid) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, user_id).await?;
    Ok(())
}

pub async fn flash(session: &Session, message: impl Into<String>) -> AppResult<()> {
    let mut messages = session.get::<Vec<String>>(FLASH).await?.unwrap_or_default();
    messages.push(message.into());
    session.insert(FLASH, messages).await?;
    Ok(())
}

pub async fn take_flash(session: &Session) -> AppResult<Vec<String>> {
    Ok(session.remove::<Vec<String>>(FLASH).await?.unwrap_or_default())
}

/// Remembers where to go after logging in. Only site-relative paths are kept.
pub async fn set_return_url(session: &Session, return_url: Option<String>) -> AppResult<()> {
    if let Some(return_url) = return_url.filter(|url| is_local(url)) {
        session.insert(RETURN_URL, return_url).await?;
    }
    Ok(())
}

pub async fn take_return_url(session: &Session) -> AppResult<String> {
    Ok(session
        .remove::<String>(RETURN_URL)
        .await?
        .unwrap_or_else(|| "/".to_owned()))
}

pub fn is_local(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\")
}

/// The logged-in user. Anonymous requests are redirected to the login page,
/// which sends them back here afterwards.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = match parts.extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri.path().to_owned(),
            None => parts.uri.path().to_owned(),
        };

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match user_id(&session).await {
            Ok(Some(user_id)) => Ok(AuthUser(user_id)),
            Ok(None) => Err(Redirect::to(&format!(
                "/login?return_url={}",
                res::url_encode(&path)
            ))
            .into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}
