use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use roomlink_core::error::{AppError, AppResult};
use roomlink_core::flash::{redirect_with_flash, FlashData};
use roomlink_core::views::user_auth::CurrentUser;
use roomlink_core::AppState;
use tower_cookies::Cookies;

use crate::serializers::favorite::{favorite_message, ToggleFavoriteOut};
use crate::service::{Mutation, Query};
use crate::views::RowId;

fn is_xhr(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest")
}

pub async fn toggle(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RowId(id): RowId,
    headers: HeaderMap,
    cookies: Cookies,
) -> AppResult<Response> {
    let listing = Query::find_active(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let is_favorited = Mutation::toggle_favorite(&state.db, user.id, listing.id).await?;

    if is_xhr(&headers) {
        return Ok(Json(ToggleFavoriteOut::new(is_favorited)).into_response());
    }
    Ok(redirect_with_flash(
        &cookies,
        &format!("/listing/{}/", listing.id),
        FlashData::success(favorite_message(is_favorited)),
    )
    .into_response())
}
