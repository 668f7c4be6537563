pub mod browse;
pub mod favorite;
pub mod listing;
pub mod profile;

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use roomlink_core::error::AppError;
use tera::Context;

use crate::models::choices::{choices, Availability, Furnishing, PropertyType};

/// Row id taken from the `:id` path segment. Text that is not an `i32`
/// gets the same 404 as a missing row.
#[derive(Debug, Clone, Copy)]
pub struct RowId(pub i32);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RowId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        raw.parse().map(RowId).map_err(|_| AppError::NotFound)
    }
}

/// Select options and value -> label maps for the listing enumerations.
pub(crate) fn insert_choices(ctx: &mut Context) {
    ctx.insert("property_types", &choices::<PropertyType>());
    ctx.insert("furnishings", &choices::<Furnishing>());
    ctx.insert("availabilities", &choices::<Availability>());

    let mut labels: HashMap<String, &'static str> = HashMap::new();
    for c in choices::<PropertyType>()
        .into_iter()
        .chain(choices::<Furnishing>())
        .chain(choices::<Availability>())
    {
        labels.insert(c.value, c.label);
    }
    ctx.insert("labels", &labels);
}
