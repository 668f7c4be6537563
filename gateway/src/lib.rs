use axum::{extract::DefaultBodyLimit, Router};
use roomlink_core::AppState;
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// The whole site: every app's routes plus static and media file serving.
pub fn app(state: AppState) -> Router {
    let settings = state.settings.clone();

    Router::new()
        .merge(roomlink_core::urls::router())
        .merge(listings::urls::router())
        .nest_service(settings.media_url.trim_end_matches('/'), ServeDir::new(&settings.media_root))
        .nest_service("/static", ServeDir::new(&settings.static_dir))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
