use anyhow::Context;
use studybud::{app, config::Config, db, session, AppState, MediaDir};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("studybud=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db_pool = db::connect(&config.database_url)
        .await
        .with_context(|| format!("opening {}", config.database_url))?;
    tokio::fs::create_dir_all(&config.media_dir)
        .await
        .with_context(|| format!("creating {}", config.media_dir.display()))?;

    let app_state = AppState {
        db_pool,
        media_dir: MediaDir(config.media_dir.clone()),
    };
    let session_layer = session::layer(config.session_secure, config.session_idle_minutes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app(app_state, session_layer)).await?;
    Ok(())
}
