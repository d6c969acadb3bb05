use axum::{
    debug_handler,
    http::header,
    response::{Html, IntoResponse, Response},
};
use pulldown_cmark::{CowStr, Event, Parser, Tag};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tower_sessions::Session;

use crate::{db, session, AppResult};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

#[debug_handler]
pub async fn default_avatar() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        include_res!(bytes, "/avatar.svg"),
    )
}

pub fn avatar_url(avatar: &str) -> String {
    if avatar == db::users::DEFAULT_AVATAR {
        "/static/avatar.svg".to_owned()
    } else {
        format!("/media/{}", url_encode(avatar))
    }
}

/// Wraps `content` in the site layout, with the navigation bar for whoever
/// is logged in and any pending flash messages.
pub async fn page(
    db_pool: &SqlitePool,
    session: &Session,
    title: &str,
    content: &str,
) -> AppResult<Response> {
    let user = match session::user_id(session).await? {
        Some(user_id) => db::users::find(db_pool, user_id).await?,
        None => None,
    };

    let nav = match user {
        Some(user) => fill(
            include_res!(str, "/pages/nav_user.html"),
            &[
                ("id", user.id.to_string().as_str()),
                ("username", escape(&user.username).as_str()),
                ("avatar", avatar_url(&user.avatar).as_str()),
            ],
        ),
        None => include_res!(str, "/pages/nav_guest.html").to_owned(),
    };

    let flash: String = session::take_flash(session)
        .await?
        .iter()
        .map(|message| format!("<li>{}</li>", escape(message)))
        .collect();

    Ok(Html(fill(
        include_res!(str, "/pages/layout.html"),
        &[
            ("title", escape(title).as_str()),
            ("nav", nav.as_str()),
            ("flash", flash.as_str()),
            ("content", content),
        ],
    ))
    .into_response())
}

/// Substitutes `{key}` placeholders in one pass, so substituted text is never
/// itself scanned for placeholders. Unknown keys are left as they are.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let found = after
            .find('}')
            .map(|end| &after[..end])
            .and_then(|key| vars.iter().find(|(k, _)| *k == key));

        match found {
            Some((key, value)) => {
                out.push_str(value);
                rest = &after[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Escapes text for element content and quoted attribute values alike.
pub fn escape(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// Form-encodes a query string value.
pub fn url_encode(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Renders a message body as Markdown. Raw HTML is shown as text and links
/// may only point at web, mail or site-relative targets.
pub fn markdown(text: &str) -> String {
    let parser = Parser::new(text).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        Event::Start(Tag::Link { link_type, dest_url, title, id }) if !is_safe_url(&dest_url) => {
            Event::Start(Tag::Link { link_type, dest_url: CowStr::Borrowed("#"), title, id })
        }
        Event::Start(Tag::Image { link_type, dest_url, title, id }) if !is_safe_url(&dest_url) => {
            Event::Start(Tag::Image { link_type, dest_url: CowStr::Borrowed("#"), title, id })
        }
        _ => event,
    });

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    html_output
}

fn is_safe_url(url: &str) -> bool {
    let url = url.trim().to_ascii_lowercase();
    match url.find(':') {
        None => true,
        Some(colon) => {
            url[..colon].contains(&['/', '?', '#'][..])
                || ["http", "https", "mailto"].contains(&&url[..colon])
        }
    }
}

/// How long ago `ts` was, e.g. `3 hours ago`.
pub fn ago(ts: OffsetDateTime) -> String {
    let elapsed = OffsetDateTime::now_utc() - ts;
    let days = elapsed.whole_days();

    let (n, unit) = if days >= 365 {
        (days / 365, "year")
    } else if days >= 30 {
        (days / 30, "month")
    } else if days >= 1 {
        (days, "day")
    } else if elapsed.whole_hours() >= 1 {
        (elapsed.whole_hours(), "hour")
    } else if elapsed.whole_minutes() >= 1 {
        (elapsed.whole_minutes(), "minute")
    } else {
        return "just now".to_owned();
    };

    format!("{n} {unit}{} ago", if n == 1 { "" } else { "s" })
}
