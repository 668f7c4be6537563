use axum::{routing::{get, post}, Router};
use roomlink_core::AppState;

use crate::views::{browse, favorite, listing, profile};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(browse::home))
        .route("/search/", get(browse::search))
        .route("/profile/", get(profile::show).post(profile::update))
        .route("/listing/create/", get(listing::create_page).post(listing::create))
        .route("/listing/:id/", get(listing::detail))
        .route("/listing/:id/edit/", get(listing::edit_page).post(listing::edit))
        .route("/listing/:id/delete/", get(listing::delete_page).post(listing::delete))
        .route("/listing/:id/images/", post(listing::add_image))
        .route("/listing/:id/favorite/", post(favorite::toggle))
}
