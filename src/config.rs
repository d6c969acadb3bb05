use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Server configuration, read from `.env` and the process environment.
/// Each field is filled from the upper-cased variable of the same name.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// sqlx SQLite URL.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Listen address (default `0.0.0.0:8080`).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Where uploaded avatars are written (default `media`).
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
    #[serde(default)]
    pub session_secure: bool,
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,
}

fn default_database_url() -> String {
    "sqlite://studybud.db?mode=rwc".to_owned()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_owned()
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("media")
}

fn default_session_idle_minutes() -> i64 {
    60
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        envy::from_env::<Self>()
            .context("reading configuration from the environment")?
            .checked()
    }

    fn checked(self) -> anyhow::Result<Self> {
        anyhow::ensure!(
            self.session_idle_minutes > 0,
            "SESSION_IDLE_MINUTES must be positive, got {}",
            self.session_idle_minutes
        );
        Ok(self)
    }
}
