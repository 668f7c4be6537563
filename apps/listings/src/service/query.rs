use roomlink_core::models::user;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::models::favorite::{self, Column as FavoriteCol, Entity as Favorite};
use crate::models::listing::{self, Column as ListingCol, Entity as Listing};
use crate::models::listing_image::{self, Column as ImageCol, Entity as ListingImage};

pub struct Query;

impl Query {
    /// A listing that may be shown on its detail page.
    pub async fn find_active<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<listing::Model>, DbErr> {
        Listing::find_by_id(id)
            .filter(ListingCol::IsActive.eq(true))
            .one(db)
            .await
    }

    /// `None` both when the listing does not exist and when someone else owns it.
    pub async fn find_owned<C: ConnectionTrait>(
        db: &C,
        id: i32,
        owner: i32,
    ) -> Result<Option<listing::Model>, DbErr> {
        Listing::find()
            .filter(ListingCol::Id.eq(id).and(ListingCol::PostedBy.eq(owner)))
            .one(db)
            .await
    }

    pub async fn poster_of<C: ConnectionTrait>(
        db: &C,
        listing: &listing::Model,
    ) -> Result<Option<user::Model>, DbErr> {
        listing.find_related(user::Entity).one(db).await
    }

    pub async fn images_for<C: ConnectionTrait>(
        db: &C,
        listing_id: i32,
    ) -> Result<Vec<listing_image::Model>, DbErr> {
        ListingImage::find()
            .filter(ImageCol::ListingId.eq(listing_id))
            .order_by_asc(ImageCol::UploadedAt)
            .order_by_asc(ImageCol::Id)
            .all(db)
            .await
    }

    pub async fn is_favorited<C: ConnectionTrait>(db: &C, user_id: i32, listing_id: i32) -> Result<bool, DbErr> {
        let n = Favorite::find()
            .filter(FavoriteCol::UserId.eq(user_id))
            .filter(FavoriteCol::ListingId.eq(listing_id))
            .count(db)
            .await?;
        Ok(n > 0)
    }

    /// Everything a user has posted, inactive listings included.
    pub async fn listings_by<C: ConnectionTrait>(db: &C, owner: i32) -> Result<Vec<listing::Model>, DbErr> {
        Listing::find()
            .filter(ListingCol::PostedBy.eq(owner))
            .order_by_desc(ListingCol::CreatedAt)
            .order_by_desc(ListingCol::Id)
            .all(db)
            .await
    }

    pub async fn favorites_of<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
    ) -> Result<Vec<(favorite::Model, listing::Model)>, DbErr> {
        let rows = Favorite::find()
            .filter(FavoriteCol::UserId.eq(user_id))
            .find_also_related(Listing)
            .order_by_desc(FavoriteCol::CreatedAt)
            .order_by_desc(FavoriteCol::Id)
            .all(db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(fav, listing)| listing.map(|l| (fav, l)))
            .collect())
    }
}
