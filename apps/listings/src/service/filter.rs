//! Search criteria to query condition.
//!
//! Every present criterion contributes one predicate; they are folded into a
//! single conjunctive condition on top of the discoverability rule.

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};
use serde::Serialize;

use crate::models::choices::{Availability, PropertyType};
use crate::models::listing::{Column, Entity as Listing};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchCriteria {
    pub location: Option<String>,
    pub property_type: Option<PropertyType>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_bedrooms: Option<i32>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// One predicate per supplied criterion.
    pub fn predicates(&self) -> Vec<SimpleExpr> {
        let mut out = Vec::new();
        if let Some(location) = self.location.as_deref().filter(|l| !l.is_empty()) {
            out.push(location_contains(location));
        }
        if let Some(property_type) = self.property_type {
            out.push(Column::PropertyType.eq(property_type));
        }
        if let Some(min) = self.min_price {
            out.push(Column::Price.gte(min));
        }
        if let Some(max) = self.max_price {
            out.push(Column::Price.lte(max));
        }
        if let Some(bedrooms) = self.min_bedrooms {
            out.push(Column::Bedrooms.gte(bedrooms));
        }
        out
    }

    pub fn condition(&self) -> Condition {
        self.predicates()
            .into_iter()
            .fold(discoverable(), |cond, predicate| cond.add(predicate))
    }
}

/// Listings shown in browse and search: active and available.
pub fn discoverable() -> Condition {
    Condition::all()
        .add(Column::IsActive.eq(true))
        .add(Column::Availability.eq(Availability::Available))
}

/// Discoverable listings matching `criteria`, newest first.
pub fn search(criteria: &SearchCriteria) -> Select<Listing> {
    Listing::find()
        .filter(criteria.condition())
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
}

/// Both sides are folded by the database so they agree on what lowercase
/// means for non-ASCII text.
fn location_contains(needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(needle));
    Expr::cust_with_exprs(
        format!("? LIKE LOWER(?) ESCAPE '{LIKE_ESCAPE}'"),
        [
            SimpleExpr::from(Func::lower(Expr::col((Listing, Column::Location)))),
            Expr::val(pattern).into(),
        ],
    )
}

const LIKE_ESCAPE: char = '!';

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}
