use anyhow::anyhow;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use cookie::{Cookie, SameSite};
use sea_orm::SqlErr;
use serde::Deserialize;
use tera::Context;
use tower_cookies::Cookies;
use tracing::{info, warn};

use crate::accounts;
use crate::error::{AppError, AppResult};
use crate::flash::{redirect_with_flash, FlashData};
use crate::forms::{FormData, FormErrors};
use crate::models::user;
use crate::render::{page_context, render};
use crate::serializers::user_auth::{LoginForm, RegistrationForm};
use crate::AppState;

// ---------- extractors ----------

/// Signed-in user; anonymous requests are redirected to the login page.
pub struct CurrentUser(pub user::Model);

/// Signed-in user when there is one.
pub struct MaybeUser(pub Option<user::Model>);

async fn session_user(parts: &mut Parts, state: &AppState) -> AppResult<Option<user::Model>> {
    let cookies = Cookies::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| AppError::Internal(anyhow!(msg)))?;
    let Some(token) = cookies
        .get(&state.settings.session.cookie_name)
        .map(|c| c.value().to_owned())
    else {
        return Ok(None);
    };
    Ok(accounts::resolve_session(state, &token).await?)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match session_user(parts, state).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_owned())
                    .unwrap_or_else(|| "/".to_owned());
                Err(AppError::LoginRequired { next })
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_user(parts, state).await?))
    }
}

// ---------- handlers ----------

fn form_context(
    user: Option<&user::Model>,
    cookies: &Cookies,
    data: &FormData,
    errors: &FormErrors,
) -> Context {
    let mut ctx = page_context(user, cookies);
    ctx.insert("values", data.values());
    ctx.insert("errors", errors);
    ctx
}

pub async fn register_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let ctx = form_context(user.as_ref(), &cookies, &FormData::default(), &FormErrors::default());
    render(&state, "register.html.tera", &ctx)
}

pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    data: FormData,
) -> AppResult<Response> {
    let rerender = |errors: FormErrors| -> AppResult<Response> {
        let ctx = form_context(None, &cookies, &data, &errors);
        Ok(render(&state, "register.html.tera", &ctx)?.into_response())
    };

    let account = match RegistrationForm::clean(&data) {
        Ok(account) => account,
        Err(errors) => return rerender(errors),
    };

    let mut errors = FormErrors::default();
    if accounts::username_taken(&state.db, &account.username).await? {
        errors.add("username", "A user with that username already exists.");
    }
    if accounts::email_taken(&state.db, &account.email).await? {
        errors.add("email", "A user with that email already exists.");
    }
    if !errors.is_empty() {
        return rerender(errors);
    }

    let created = match accounts::create_account(&state.db, account).await {
        Ok(created) => created,
        // lost a race with a concurrent registration
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            warn!(error = %err, "registration hit a unique constraint");
            let mut errors = FormErrors::default();
            errors.add_non_field("A user with that username or email already exists.");
            return rerender(errors);
        }
        Err(err) => return Err(err.into()),
    };

    let token = accounts::issue_session(&state, &created).await?;
    cookies.add(session_cookie(&state, token));

    Ok(redirect_with_flash(
        &cookies,
        "/",
        FlashData::success("Account created successfully! Welcome to RoomLink Nairobi!"),
    )
    .into_response())
}

#[derive(Deserialize)]
pub struct NextParam {
    next: Option<String>,
}

pub async fn login_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<NextParam>,
    cookies: Cookies,
) -> AppResult<Html<String>> {
    let mut ctx = form_context(user.as_ref(), &cookies, &FormData::default(), &FormErrors::default());
    ctx.insert("next", &params.next.as_deref().map(safe_next).unwrap_or("/"));
    render(&state, "login.html.tera", &ctx)
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    data: FormData,
) -> AppResult<Response> {
    let next = safe_next(data.text("next")).to_owned();

    let found = match LoginForm::clean(&data) {
        Ok(creds) => accounts::authenticate(&state.db, &creds.identifier, &creds.password).await?,
        Err(errors) => {
            let mut ctx = form_context(None, &cookies, &data, &errors);
            ctx.insert("next", &next);
            return Ok(render(&state, "login.html.tera", &ctx)?.into_response());
        }
    };

    let Some(user) = found else {
        let mut errors = FormErrors::default();
        errors.add_non_field(
            "Please enter a correct username and password. Note that both fields may be case-sensitive.",
        );
        let mut ctx = form_context(None, &cookies, &data, &errors);
        ctx.insert("next", &next);
        return Ok(render(&state, "login.html.tera", &ctx)?.into_response());
    };

    let token = accounts::issue_session(&state, &user).await?;
    cookies.add(session_cookie(&state, token));
    info!(user_id = user.id, "logged in");
    Ok(Redirect::to(&next).into_response())
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> AppResult<Redirect> {
    let name = &state.settings.session.cookie_name;
    if let Some(token) = cookies.get(name).map(|c| c.value().to_owned()) {
        accounts::revoke_session(&state, &token).await?;
    }
    cookies.remove(clear_session_cookie(&state));
    Ok(redirect_with_flash(&cookies, "/", FlashData::success("You have been logged out.")))
}

/// Only same-site absolute paths are honoured as redirect targets.
pub fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

// ---------- cookies ----------

fn session_cookie(state: &AppState, value: String) -> Cookie<'static> {
    let cfg = &state.settings.session;
    let mut c = Cookie::build((cfg.cookie_name.clone(), value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(cfg.ttl.num_seconds()))
        .build();

    if cfg.cookie_secure {
        c.set_secure(true);
    }
    if let Some(ref d) = cfg.cookie_domain {
        c.set_domain(d.clone());
    }
    c
}

fn clear_session_cookie(state: &AppState) -> Cookie<'static> {
    let cfg = &state.settings.session;
    let mut c = Cookie::build((cfg.cookie_name.clone(), String::new()))
        .path("/")
        .build();
    if let Some(ref d) = cfg.cookie_domain {
        c.set_domain(d.clone());
    }
    c
}
