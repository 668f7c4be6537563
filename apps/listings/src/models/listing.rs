use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::choices::{Availability, Furnishing, PropertyType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub property_type: PropertyType,
    pub furnished: Furnishing,
    pub location: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_feet: Option<i32>,
    pub availability: Availability,
    /// Owning user.
    pub posted_by: i32,
    pub contact_phone: String,
    pub contact_email: String,
    #[sea_orm(column_type = "Text")]
    pub amenities: String,
    /// Opaque image-store reference.
    pub main_image: Option<String>,
    pub is_active: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "roomlink_core::models::user::Entity",
        from = "Column::PostedBy",
        to = "roomlink_core::models::user::Column::Id",
        on_delete = "Cascade"
    )]
    PostedBy,
    #[sea_orm(has_many = "super::listing_image::Entity")]
    Images,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
}

impl Related<roomlink_core::models::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostedBy.def()
    }
}

impl Related<super::listing_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
