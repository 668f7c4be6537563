use std::collections::HashMap;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use roomlink_core::error::{AppError, AppResult};
use roomlink_core::flash::{redirect_with_flash, FlashData};
use roomlink_core::forms::{FormData, FormErrors};
use roomlink_core::models::user;
use roomlink_core::render::{page_context, render};
use roomlink_core::views::user_auth::{CurrentUser, MaybeUser};
use roomlink_core::AppState;
use sea_orm::ActiveEnum;
use tera::Context;
use tower_cookies::Cookies;
use tracing::warn;

use crate::models::choices::Availability;
use crate::models::listing;
use crate::serializers::listing::{ListingForm, ListingImageForm};
use crate::service::{Mutation, Query};
use crate::views::{insert_choices, RowId};

const IMAGE_FOLDER: &str = "listing_images";

fn detail_url(id: i32) -> String {
    format!("/listing/{id}/")
}

async fn owned_or_404(state: &AppState, id: i32, owner: &user::Model) -> AppResult<listing::Model> {
    Query::find_owned(&state.db, id, owner.id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn detail(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    RowId(id): RowId,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let listing = Query::find_active(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let images = Query::images_for(&state.db, listing.id).await?;
    let poster = Query::poster_of(&state.db, &listing).await?;
    let is_favorited = match viewer {
        Some(ref v) => Query::is_favorited(&state.db, v.id, listing.id).await?,
        None => false,
    };
    let is_owner = viewer.as_ref().is_some_and(|v| v.id == listing.posted_by);
    let amenities: Vec<&str> = listing
        .amenities
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .collect();

    let mut ctx = page_context(viewer.as_ref(), &cookies);
    ctx.insert("listing", &listing);
    ctx.insert("images", &images);
    ctx.insert("poster", &poster);
    ctx.insert("amenities", &amenities);
    ctx.insert("is_favorited", &is_favorited);
    ctx.insert("is_owner", &is_owner);
    insert_choices(&mut ctx);
    render(&state, "listing_detail.html.tera", &ctx)
}

// ---------- create / edit ----------

fn form_context(
    user: &user::Model,
    cookies: &Cookies,
    title: &str,
    action: &str,
    values: &HashMap<String, String>,
    errors: &FormErrors,
) -> Context {
    let mut ctx = page_context(Some(user), cookies);
    ctx.insert("title", title);
    ctx.insert("action", action);
    ctx.insert("values", values);
    ctx.insert("errors", errors);
    insert_choices(&mut ctx);
    ctx
}

pub async fn create_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let values = HashMap::from([("availability".to_owned(), Availability::default().to_value())]);
    let ctx = form_context(
        &user,
        &cookies,
        "Create New Listing",
        "/listing/create/",
        &values,
        &FormErrors::default(),
    );
    render(&state, "listing_form.html.tera", &ctx)
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    cookies: Cookies,
    data: FormData,
) -> AppResult<Response> {
    let input = match ListingForm::clean(&data) {
        Ok(input) => input,
        Err(errors) => {
            let ctx = form_context(
                &user,
                &cookies,
                "Create New Listing",
                "/listing/create/",
                data.values(),
                &errors,
            );
            return Ok(render(&state, "listing_form.html.tera", &ctx)?.into_response());
        }
    };

    let main_image = match input.main_image {
        Some(ref upload) => Some(state.media.save(IMAGE_FOLDER, upload).await?),
        None => None,
    };
    let created = Mutation::create_listing(&state.db, user.id, &input, main_image).await?;

    Ok(redirect_with_flash(
        &cookies,
        &detail_url(created.id),
        FlashData::success("Listing created successfully!"),
    )
    .into_response())
}

pub async fn edit_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RowId(id): RowId,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let listing = owned_or_404(&state, id, &user).await?;
    let mut ctx = form_context(
        &user,
        &cookies,
        "Edit Listing",
        &format!("/listing/{id}/edit/"),
        &ListingForm::initial(&listing),
        &FormErrors::default(),
    );
    ctx.insert("listing", &listing);
    render(&state, "listing_form.html.tera", &ctx)
}

pub async fn edit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RowId(id): RowId,
    cookies: Cookies,
    data: FormData,
) -> AppResult<Response> {
    let listing = owned_or_404(&state, id, &user).await?;

    let input = match ListingForm::clean(&data) {
        Ok(input) => input,
        Err(errors) => {
            let mut ctx = form_context(
                &user,
                &cookies,
                "Edit Listing",
                &format!("/listing/{id}/edit/"),
                data.values(),
                &errors,
            );
            ctx.insert("listing", &listing);
            return Ok(render(&state, "listing_form.html.tera", &ctx)?.into_response());
        }
    };

    let main_image = match input.main_image {
        Some(ref upload) => Some(state.media.save(IMAGE_FOLDER, upload).await?),
        None => None,
    };
    let updated = Mutation::update_listing(&state.db, listing, &input, main_image).await?;

    Ok(redirect_with_flash(
        &cookies,
        &detail_url(updated.id),
        FlashData::success("Listing updated successfully!"),
    )
    .into_response())
}

// ---------- delete ----------

pub async fn delete_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RowId(id): RowId,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let listing = owned_or_404(&state, id, &user).await?;
    let mut ctx = page_context(Some(&user), &cookies);
    ctx.insert("listing", &listing);
    render(&state, "listing_confirm_delete.html.tera", &ctx)
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RowId(id): RowId,
    cookies: Cookies,
) -> AppResult<Response> {
    if !Mutation::delete_owned(&state.db, id, user.id).await? {
        return Err(AppError::NotFound);
    }
    Ok(redirect_with_flash(
        &cookies,
        "/profile/",
        FlashData::success("Listing deleted successfully!"),
    )
    .into_response())
}

// ---------- gallery ----------

pub async fn add_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    RowId(id): RowId,
    cookies: Cookies,
    data: FormData,
) -> AppResult<Response> {
    let listing = owned_or_404(&state, id, &user).await?;
    let to = detail_url(listing.id);

    let image = match ListingImageForm::clean(&data) {
        Ok(image) => image,
        Err(errors) => {
            warn!(listing_id = listing.id, ?errors, "gallery upload rejected");
            let message = errors
                .get("image")
                .first()
                .or_else(|| errors.get("caption").first())
                .cloned()
                .unwrap_or_else(|| "Image could not be added.".to_owned());
            return Ok(redirect_with_flash(&cookies, &to, FlashData::error(message)).into_response());
        }
    };

    let reference = state.media.save(IMAGE_FOLDER, &image.image).await?;
    Mutation::add_image(&state.db, listing.id, reference, image.caption).await?;

    Ok(redirect_with_flash(&cookies, &to, FlashData::success("Image added successfully!")).into_response())
}
