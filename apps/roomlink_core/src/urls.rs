use axum::{routing::{get, post}, Router};

use crate::views::{pages, user_auth};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(pages::health))
        .route("/about/", get(pages::about))
        .route("/contact/", get(pages::contact))
        .route("/register/", get(user_auth::register_page).post(user_auth::register))
        .route("/login/", get(user_auth::login_page).post(user_auth::login))
        .route("/logout/", post(user_auth::logout))
}
