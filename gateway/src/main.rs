use std::net::SocketAddr;
use std::sync::Arc;

use dotenvy::dotenv;
use roomlink_core::{config::Settings, media::LocalImageStore, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let settings = Settings::from_env()?;

    let db = roomlink_core::connect(&settings.database_url).await?;
    roomlink_core::ensure_schema(&db).await?;
    let templates = roomlink_core::load_templates(&settings.templates_glob)?;
    let media = Arc::new(LocalImageStore::new(&settings.media_root, &settings.media_url));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let app = gateway::app(AppState::new(db, templates, media, settings));

    info!("listening on http://{}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
