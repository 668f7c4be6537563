pub mod accounts;
pub mod config;
pub mod error;
pub mod flash;
pub mod forms;
pub mod media;
pub mod models;
pub mod render;
pub mod serializers;
pub mod urls;
pub mod views;

use std::sync::Arc;

use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, EncodingKey};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tera::Tera;
use tracing::info;

use crate::config::Settings;
use crate::media::{ImageStore, MediaUrlFilter};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub templates: Arc<Tera>,
    pub media: Arc<dyn ImageStore>,
    pub session_enc: Arc<EncodingKey>,
    pub session_dec: Arc<DecodingKey>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        mut templates: Tera,
        media: Arc<dyn ImageStore>,
        settings: Settings,
    ) -> Self {
        templates.register_filter("media_url", MediaUrlFilter(media.clone()));
        let secret = settings.session.secret.as_bytes();
        Self {
            db,
            templates: Arc::new(templates),
            session_enc: Arc::new(EncodingKey::from_secret(secret)),
            session_dec: Arc::new(DecodingKey::from_secret(secret)),
            media,
            settings: Arc::new(settings),
        }
    }
}

pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    opts.sqlx_logging(false);
    if database_url.starts_with("sqlite::memory:") {
        // each pooled connection would otherwise see its own empty database
        opts.max_connections(1);
    }
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("connecting to {database_url}"))?;
    info!("database connected");
    Ok(db)
}

/// Ensure DB schema is up-to-date (calls migration crate).
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<()> {
    use migration::Migrator;
    use sea_orm_migration::migrator::MigratorTrait;
    Migrator::up(db, None).await?;
    Ok(())
}

pub fn load_templates(glob: &str) -> Result<Tera> {
    let mut tera = Tera::new(glob).with_context(|| format!("loading templates from {glob}"))?;
    tera.autoescape_on(vec![".html.tera", ".html"]);
    info!(count = tera.get_template_names().count(), "templates loaded");
    Ok(tera)
}
