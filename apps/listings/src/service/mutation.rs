use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};
use tracing::info;

use crate::models::favorite::{self, Column as FavoriteCol, Entity as Favorite};
use crate::models::listing::{self, Column as ListingCol, Entity as Listing};
use crate::models::listing_image;
use crate::serializers::listing::ListingInput;

pub struct Mutation;

impl Mutation {
    /// `main_image` is an image-store reference saved by the caller.
    pub async fn create_listing<C: ConnectionTrait>(
        db: &C,
        owner: i32,
        input: &ListingInput,
        main_image: Option<String>,
    ) -> Result<listing::Model, DbErr> {
        let now = Utc::now();
        let created = listing::ActiveModel {
            id: NotSet,
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            property_type: Set(input.property_type),
            furnished: Set(input.furnished),
            location: Set(input.location.clone()),
            address: Set(input.address.clone()),
            price: Set(input.price),
            bedrooms: Set(input.bedrooms),
            bathrooms: Set(input.bathrooms),
            square_feet: Set(input.square_feet),
            availability: Set(input.availability),
            posted_by: Set(owner),
            contact_phone: Set(input.contact_phone.clone()),
            contact_email: Set(input.contact_email.clone()),
            amenities: Set(input.amenities.clone()),
            main_image: Set(main_image),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        info!(listing_id = created.id, owner, "listing created");
        Ok(created)
    }

    /// Overwrites the editable fields. The main image is replaced only when a
    /// new reference is given.
    pub async fn update_listing<C: ConnectionTrait>(
        db: &C,
        current: listing::Model,
        input: &ListingInput,
        main_image: Option<String>,
    ) -> Result<listing::Model, DbErr> {
        let mut am = current.into_active_model();
        am.title = Set(input.title.clone());
        am.description = Set(input.description.clone());
        am.property_type = Set(input.property_type);
        am.furnished = Set(input.furnished);
        am.location = Set(input.location.clone());
        am.address = Set(input.address.clone());
        am.price = Set(input.price);
        am.bedrooms = Set(input.bedrooms);
        am.bathrooms = Set(input.bathrooms);
        am.square_feet = Set(input.square_feet);
        am.availability = Set(input.availability);
        am.contact_phone = Set(input.contact_phone.clone());
        am.contact_email = Set(input.contact_email.clone());
        am.amenities = Set(input.amenities.clone());
        if let Some(reference) = main_image {
            am.main_image = Set(Some(reference));
        }
        am.updated_at = Set(Utc::now());
        am.update(db).await
    }

    /// Deletes the listing only if `owner` posted it. Returns whether a row
    /// was removed; images and favorites go with it.
    pub async fn delete_owned<C: ConnectionTrait>(db: &C, id: i32, owner: i32) -> Result<bool, DbErr> {
        let res = Listing::delete_many()
            .filter(ListingCol::Id.eq(id).and(ListingCol::PostedBy.eq(owner)))
            .exec(db)
            .await?;
        if res.rows_affected > 0 {
            info!(listing_id = id, owner, "listing deleted");
        }
        Ok(res.rows_affected > 0)
    }

    pub async fn add_image<C: ConnectionTrait>(
        db: &C,
        listing_id: i32,
        image: String,
        caption: String,
    ) -> Result<listing_image::Model, DbErr> {
        listing_image::ActiveModel {
            id: NotSet,
            listing_id: Set(listing_id),
            image: Set(image),
            caption: Set(caption),
            uploaded_at: Set(Utc::now()),
        }
        .insert(db)
        .await
    }

    /// Flips the (user, listing) favorite and returns the new state.
    pub async fn toggle_favorite<C>(db: &C, user_id: i32, listing_id: i32) -> Result<bool, DbErr>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;

        let removed = Favorite::delete_many()
            .filter(FavoriteCol::UserId.eq(user_id))
            .filter(FavoriteCol::ListingId.eq(listing_id))
            .exec(&txn)
            .await?
            .rows_affected;

        let favorited = if removed > 0 {
            false
        } else {
            let row = favorite::ActiveModel {
                id: NotSet,
                user_id: Set(user_id),
                listing_id: Set(listing_id),
                created_at: Set(Utc::now()),
            };
            Favorite::insert(row)
                .on_conflict(
                    OnConflict::columns([FavoriteCol::UserId, FavoriteCol::ListingId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
            true
        };

        txn.commit().await?;
        info!(user_id, listing_id, favorited, "favorite toggled");
        Ok(favorited)
    }
}
