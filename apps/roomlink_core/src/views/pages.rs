use axum::{extract::State, response::Html, Json};
use serde::Serialize;
use tower_cookies::Cookies;

use crate::error::AppResult;
use crate::render::{page_context, render};
use crate::views::user_auth::MaybeUser;
use crate::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub app: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok", app: "roomlink" })
}

pub async fn about(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    render(&state, "about.html.tera", &page_context(user.as_ref(), &cookies))
}

pub async fn contact(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    render(&state, "contact.html.tera", &page_context(user.as_ref(), &cookies))
}
