use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_AVATAR: &str = "avatar.svg";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: String,
    pub password_hash: String,
    pub created: OffsetDateTime,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

#[derive(Debug)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    /// `None` keeps the current avatar.
    pub avatar: Option<String>,
}

const USER_COLUMNS: &str = "id,username,email,name,bio,avatar,password_hash,created";

pub async fn create(db_pool: &SqlitePool, new: NewUser) -> Result<User, sqlx::Error> {
    let user = User {
        id: Uuid::now_v7(),
        username: new.username,
        email: new.email,
        name: new.name,
        bio: None,
        avatar: DEFAULT_AVATAR.to_owned(),
        password_hash: new.password_hash,
        created: OffsetDateTime::now_utc(),
    };

    sqlx::query("INSERT INTO users (id,username,email,name,bio,avatar,password_hash,created) VALUES (?,?,?,?,?,?,?,?)")
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.bio)
        .bind(&user.avatar)
        .bind(&user.password_hash)
        .bind(user.created)
        .execute(db_pool)
        .await?;

    Ok(user)
}

pub async fn find(db_pool: &SqlitePool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn find_by_email(db_pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email=?"))
        .bind(email)
        .fetch_optional(db_pool)
        .await
}

/// Whether another user already holds `username`.
pub async fn username_taken(
    db_pool: &SqlitePool,
    username: &str,
    except: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    Ok(sqlx::query("SELECT 1 FROM users WHERE username=? AND id IS NOT ?")
        .bind(username)
        .bind(except)
        .fetch_optional(db_pool)
        .await?
        .is_some())
}

/// Whether another user already holds `email`.
pub async fn email_taken(
    db_pool: &SqlitePool,
    email: &str,
    except: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    Ok(sqlx::query("SELECT 1 FROM users WHERE email=? AND id IS NOT ?")
        .bind(email)
        .bind(except)
        .fetch_optional(db_pool)
        .await?
        .is_some())
}

pub async fn update_profile(
    db_pool: &SqlitePool,
    id: Uuid,
    update: ProfileUpdate,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET username=?, email=?, name=?, bio=?, avatar=COALESCE(?, avatar) WHERE id=?")
        .bind(update.username)
        .bind(update.email)
        .bind(update.name)
        .bind(update.bio)
        .bind(update.avatar)
        .bind(id)
        .execute(db_pool)
        .await?;
    Ok(())
}
