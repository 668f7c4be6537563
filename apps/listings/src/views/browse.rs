use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::Html;
use roomlink_core::error::AppResult;
use roomlink_core::forms::FormData;
use roomlink_core::render::{page_context, render};
use roomlink_core::views::user_auth::MaybeUser;
use roomlink_core::AppState;
use tower_cookies::Cookies;

use crate::serializers::search::SearchForm;
use crate::service::filter;
use crate::service::pagination::{paginate, PAGE_SIZE};
use crate::views::insert_choices;

pub async fn home(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<HashMap<String, String>>,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    browse(&state, user.as_ref(), &params, &cookies, "home.html.tera").await
}

pub async fn search(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<HashMap<String, String>>,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    browse(&state, user.as_ref(), &params, &cookies, "search.html.tera").await
}

async fn browse(
    state: &AppState,
    user: Option<&roomlink_core::models::user::Model>,
    params: &HashMap<String, String>,
    cookies: &Cookies,
    template: &str,
) -> AppResult<Html<String>> {
    let data = FormData::from_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let (criteria, errors) = SearchForm::clean(&data);

    let page = paginate(
        &state.db,
        filter::search(&criteria),
        params.get("page").map(String::as_str),
        PAGE_SIZE,
    )
    .await?;

    let mut ctx = page_context(user, cookies);
    ctx.insert("total_listings", &page.total);
    ctx.insert("page_obj", &page);
    ctx.insert("values", data.values());
    ctx.insert("errors", &errors);
    ctx.insert("querystring", &querystring_without_page(params));
    insert_choices(&mut ctx);
    render(state, template, &ctx)
}

/// Current search parameters, re-encoded for pagination links.
fn querystring_without_page(params: &HashMap<String, String>) -> String {
    let mut pairs: Vec<_> = params
        .iter()
        .filter(|(k, v)| k.as_str() != "page" && !v.trim().is_empty())
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}&", urlencoding::encode(k), urlencoding::encode(v)))
        .collect()
}
