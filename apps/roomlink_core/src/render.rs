use axum::response::Html;
use tera::Context;
use tower_cookies::Cookies;

use crate::error::AppResult;
use crate::flash::take_flash;
use crate::models::user;
use crate::AppState;

/// Context every page starts from: the signed-in user and any pending flash.
pub fn page_context(user: Option<&user::Model>, cookies: &Cookies) -> Context {
    let mut ctx = Context::new();
    ctx.insert("user", &user);
    if let Some(flash) = take_flash(cookies) {
        ctx.insert("flash", &flash);
    }
    ctx
}

pub fn render(state: &AppState, template: &str, ctx: &Context) -> AppResult<Html<String>> {
    Ok(Html(state.templates.render(template, ctx)?))
}
