use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

/// Request-scoped failures. None of these are fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing row, or a row the caller is not allowed to see. The two are
    /// deliberately reported the same way.
    #[error("not found")]
    NotFound,

    #[error("login required")]
    LoginRequired { next: String },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Db(#[from] DbErr),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

pub fn login_url(next: &str) -> String {
    format!("/login/?next={}", urlencoding::encode(next))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html("<h1>Not Found</h1><p>The requested resource was not found on this server.</p>"),
            )
                .into_response(),
            AppError::LoginRequired { next } => Redirect::to(&login_url(&next)).into_response(),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>Server Error (500)</h1>"),
                )
                    .into_response()
            }
        }
    }
}
