use std::path::Path;

use axum::{
    body::Bytes,
    debug_handler,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    db::{self, ProfileUpdate},
    forms::{self, FormError, ProfileForm, ValidProfile},
    include_res,
    res::{self, escape, fill},
    session::{self, AuthUser},
    AppError, AppResult, AppState, MediaDir,
};

async fn profile_form(
    db_pool: &SqlitePool,
    session: &Session,
    user_id: Uuid,
    form: &ProfileForm,
) -> AppResult<Response> {
    let body = fill(
        include_res!(str, "/pages/update_user.html"),
        &[
            ("name", escape(&form.name).as_str()),
            ("username", escape(&form.username).as_str()),
            ("email", escape(&form.email).as_str()),
            ("bio", escape(&form.bio).as_str()),
            ("id", user_id.to_string().as_str()),
        ],
    );
    res::page(db_pool, session, "Edit profile", &body).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_profile_page(
    AuthUser(user_id): AuthUser,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = db::users::find(&db_pool, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let form = ProfileForm {
        name: user.name.unwrap_or_default(),
        username: user.username,
        email: user.email,
        bio: user.bio.unwrap_or_default(),
    };
    profile_form(&db_pool, &session, user_id, &form).await
}

async fn read_form(mut multipart: Multipart) -> AppResult<(ProfileForm, Option<Bytes>)> {
    let mut form = ProfileForm::default();
    let mut avatar = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "avatar" => {
                let data = field.bytes().await?;
                // browsers send an empty part when no file was picked
                if !data.is_empty() {
                    avatar = Some(data);
                }
            }
            "name" => form.name = field.text().await?,
            "username" => form.username = field.text().await?,
            "email" => form.email = field.text().await?,
            "bio" => form.bio = field.text().await?,
            _ => {}
        }
    }

    Ok((form, avatar))
}

/// Writes the avatar under a fresh name inside the media directory and
/// returns that name.
async fn save_avatar(media_dir: &Path, ext: &str, data: &[u8]) -> AppResult<String> {
    let file_name = format!("{}.{ext}", Uuid::now_v7());
    tokio::fs::write(media_dir.join(&file_name), data).await?;
    Ok(file_name)
}

async fn remove_avatar(media_dir: &Path, file_name: &str) {
    if let Err(e) = tokio::fs::remove_file(media_dir.join(file_name)).await {
        tracing::warn!(error = %e, file_name, "avatar not removed");
    }
}

/// Validates the submitted profile against the other accounts, returning
/// the normalized fields and the avatar's extension.
async fn check_profile<'a>(
    db_pool: &SqlitePool,
    user_id: Uuid,
    form: &'a ProfileForm,
    avatar: Option<Bytes>,
) -> AppResult<Result<(ValidProfile<'a>, Option<&'static str>), FormError>> {
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(e) => return Ok(Err(e)),
    };
    if db::users::username_taken(db_pool, &valid.username, Some(user_id)).await? {
        return Ok(Err(FormError::UsernameTaken));
    }
    if db::users::email_taken(db_pool, &valid.email, Some(user_id)).await? {
        return Ok(Err(FormError::EmailTaken));
    }

    let Some(data) = avatar else {
        return Ok(Ok((valid, None)));
    };
    // decoding a large image is CPU-bound
    let ext = tokio::task::spawn_blocking(move || forms::avatar_extension(&data)).await?;
    Ok(ext.map(|ext| (valid, Some(ext))))
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_profile(
    AuthUser(user_id): AuthUser,
    State(db_pool): State<SqlitePool>,
    State(MediaDir(media_dir)): State<MediaDir>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Response> {
    let (form, upload) = read_form(multipart).await?;

    let (valid, ext) = match check_profile(&db_pool, user_id, &form, upload.clone()).await? {
        Ok(checked) => checked,
        Err(e) => {
            session::flash(&session, e.to_string()).await?;
            return profile_form(&db_pool, &session, user_id, &form).await;
        }
    };

    let previous = db::users::find(&db_pool, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?
        .avatar;

    let avatar = match (ext, &upload) {
        (Some(ext), Some(data)) => Some(save_avatar(&media_dir, ext, data).await?),
        _ => None,
    };

    let updated = db::users::update_profile(
        &db_pool,
        user_id,
        ProfileUpdate {
            username: valid.username,
            email: valid.email,
            name: valid.name.map(str::to_owned),
            bio: valid.bio.map(str::to_owned),
            avatar: avatar.clone(),
        },
    )
    .await;

    if let Err(e) = updated {
        if let Some(file_name) = &avatar {
            remove_avatar(&media_dir, file_name).await;
        }
        return Err(e.into());
    }
    if avatar.is_some() && previous != db::users::DEFAULT_AVATAR {
        remove_avatar(&media_dir, &previous).await;
    }

    tracing::info!(%user_id, "profile updated");
    Ok(Redirect::to(&format!("/profile/{user_id}")).into_response())
}
