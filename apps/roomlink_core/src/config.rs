use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;
use std::env;

#[derive(Debug, Clone)]
pub struct SessionCfg {
    /// HS256 signing secret for session tokens. Required outside of tests.
    pub secret: String,
    /// Session lifetime (default 14 days). Override with SESSION_TTL_SECS.
    pub ttl: ChronoDuration,
    pub cookie_secure: bool,
    pub cookie_domain: Option<String>,
    pub cookie_name: String,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            secret: "roomlink-dev-secret".into(),
            ttl: ChronoDuration::days(14),
            cookie_secure: false,
            cookie_domain: None,
            cookie_name: "roomlink_session".into(),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub port: u16,
    /// Glob handed to Tera, e.g. `templates/**/*`.
    pub templates_glob: String,
    pub static_dir: String,
    pub media_root: String,
    /// Public prefix the media directory is served under.
    pub media_url: String,
    pub max_upload_bytes: usize,
    pub session: SessionCfg,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            port: 8000,
            templates_glob: "templates/**/*".into(),
            static_dir: "static".into(),
            media_root: "media".into(),
            media_url: "/media".into(),
            max_upload_bytes: 10 * 1024 * 1024,
            session: SessionCfg::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(p) => p.parse().context("PORT must be a valid number")?,
            Err(_) => defaults.port,
        };
        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(v) => v.parse().context("MAX_UPLOAD_BYTES must be a number of bytes")?,
            Err(_) => defaults.max_upload_bytes,
        };

        let session_ttl = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(ChronoDuration::seconds)
            .unwrap_or(defaults.session.ttl);
        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
            .unwrap_or(false);

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port,
            templates_glob: env::var("TEMPLATES_DIR")
                .map(|dir| format!("{}/**/*", dir.trim_end_matches('/')))
                .unwrap_or(defaults.templates_glob),
            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
            media_root: env::var("MEDIA_ROOT").unwrap_or(defaults.media_root),
            media_url: env::var("MEDIA_URL").unwrap_or(defaults.media_url),
            max_upload_bytes,
            session: SessionCfg {
                secret: env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?,
                ttl: session_ttl,
                cookie_secure,
                cookie_domain: env::var("COOKIE_DOMAIN").ok(),
                cookie_name: env::var("SESSION_COOKIE_NAME")
                    .unwrap_or(defaults.session.cookie_name),
            },
        })
    }
}
