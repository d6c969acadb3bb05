use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{routing::get, Router};
use sqlx::SqlitePool;

use crate::{
    db::{self, NewUser, User},
    forms::{FormError, Registration},
    AppResult, AppState,
};

mod login;
mod logout;
mod register;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page).post(login::login))
        .route("/logout", get(logout::logout))
        .route("/register", get(register::register_page).post(register::register))
}

/// Argon2id hash in PHC string form.
pub(crate) async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || -> AppResult<String> {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    })
    .await?
}

pub(crate) async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || -> AppResult<bool> {
        let parsed = PasswordHash::new(&password_hash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await?
}

/// Persists a validated registration. A taken username or email comes back
/// as the inner error; only store failures are outer errors.
pub(crate) async fn create_user(
    db_pool: &SqlitePool,
    registration: Registration<'_>,
) -> AppResult<Result<User, FormError>> {
    if db::users::username_taken(db_pool, &registration.username, None).await? {
        return Ok(Err(FormError::UsernameTaken));
    }
    if db::users::email_taken(db_pool, &registration.email, None).await? {
        return Ok(Err(FormError::EmailTaken));
    }

    let password_hash = hash_password(registration.password.to_owned()).await?;
    let created = db::users::create(
        db_pool,
        NewUser {
            username: registration.username,
            email: registration.email.clone(),
            name: registration.name.map(str::to_owned),
            password_hash,
        },
    )
    .await;

    match created {
        Ok(user) => Ok(Ok(user)),
        Err(e) if db::is_unique_violation(&e) => {
            if db::users::email_taken(db_pool, &registration.email, None).await? {
                Ok(Err(FormError::EmailTaken))
            } else {
                Ok(Err(FormError::UsernameTaken))
            }
        }
        Err(e) => Err(e.into()),
    }
}
