use std::collections::HashMap;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use roomlink_core::accounts;
use roomlink_core::error::{AppError, AppResult};
use roomlink_core::flash::{redirect_with_flash, FlashData};
use roomlink_core::forms::{FormData, FormErrors};
use roomlink_core::models::{user, user_profile};
use roomlink_core::render::{page_context, render};
use roomlink_core::serializers::profile::ProfileForm;
use roomlink_core::views::user_auth::CurrentUser;
use roomlink_core::AppState;
use serde::Serialize;
use tower_cookies::Cookies;

use crate::models::{favorite, listing};
use crate::service::Query;
use crate::views::insert_choices;

#[derive(Serialize)]
struct FavoriteRow {
    #[serde(flatten)]
    favorite: favorite::Model,
    listing: listing::Model,
}

fn initial(profile: &user_profile::Model) -> HashMap<String, String> {
    let mut values = HashMap::from([
        ("phone_number".to_owned(), profile.phone_number.clone().unwrap_or_default()),
        ("bio".to_owned(), profile.bio.clone()),
    ]);
    if profile.is_landlord {
        values.insert("is_landlord".to_owned(), "on".to_owned());
    }
    values
}

async fn render_profile(
    state: &AppState,
    user: &user::Model,
    profile: &user_profile::Model,
    cookies: &Cookies,
    values: &HashMap<String, String>,
    errors: &FormErrors,
) -> AppResult<Html<String>> {
    let user_listings = Query::listings_by(&state.db, user.id).await?;
    let user_favorites: Vec<FavoriteRow> = Query::favorites_of(&state.db, user.id)
        .await?
        .into_iter()
        .map(|(favorite, listing)| FavoriteRow { favorite, listing })
        .collect();

    let mut ctx = page_context(Some(user), cookies);
    ctx.insert("profile", profile);
    ctx.insert("values", values);
    ctx.insert("errors", errors);
    ctx.insert("user_listings", &user_listings);
    ctx.insert("user_favorites", &user_favorites);
    insert_choices(&mut ctx);
    render(state, "profile.html.tera", &ctx)
}

async fn profile_of(state: &AppState, user: &user::Model) -> AppResult<user_profile::Model> {
    accounts::find_profile(&state.db, user.id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let profile = profile_of(&state, &user).await?;
    render_profile(&state, &user, &profile, &cookies, &initial(&profile), &FormErrors::default()).await
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    cookies: Cookies,
    data: FormData,
) -> AppResult<Response> {
    let profile = profile_of(&state, &user).await?;

    let changes = match ProfileForm::clean(&data) {
        Ok(changes) => changes,
        Err(errors) => {
            let page = render_profile(&state, &user, &profile, &cookies, data.values(), &errors).await?;
            return Ok(page.into_response());
        }
    };

    accounts::update_profile(&state, profile, changes).await?;
    Ok(redirect_with_flash(
        &cookies,
        "/profile/",
        FlashData::success("Profile updated successfully!"),
    )
    .into_response())
}
