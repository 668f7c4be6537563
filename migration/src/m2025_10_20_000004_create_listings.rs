use sea_orm_migration::prelude::*;

/// Table: listings (FK -> users)
#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
    Title,
    Description,
    PropertyType,
    Furnished,
    Location,
    Address,
    Price,
    Bedrooms,
    Bathrooms,
    SquareFeet,
    Availability,
    PostedBy,
    ContactPhone,
    ContactEmail,
    Amenities,
    MainImage,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

/// Table: listing_images (FK -> listings)
#[derive(DeriveIden)]
enum ListingImages {
    Table,
    Id,
    ListingId,
    Image,
    Caption,
    UploadedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // listings
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Listings::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Listings::Description).text().not_null())
                    .col(ColumnDef::new(Listings::PropertyType).string_len(20).not_null())
                    .col(ColumnDef::new(Listings::Furnished).string_len(20).not_null())
                    .col(ColumnDef::new(Listings::Location).string_len(200).not_null())
                    .col(ColumnDef::new(Listings::Address).text().not_null())
                    .col(ColumnDef::new(Listings::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Listings::Bedrooms).integer().not_null())
                    .col(ColumnDef::new(Listings::Bathrooms).integer().not_null())
                    .col(ColumnDef::new(Listings::SquareFeet).integer().null())
                    .col(
                        ColumnDef::new(Listings::Availability)
                            .string_len(20)
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(Listings::PostedBy).integer().not_null())
                    .col(ColumnDef::new(Listings::ContactPhone).string_len(15).not_null().default(""))
                    .col(ColumnDef::new(Listings::ContactEmail).string_len(254).not_null().default(""))
                    .col(ColumnDef::new(Listings::Amenities).text().not_null().default(""))
                    .col(ColumnDef::new(Listings::MainImage).string().null())
                    .col(ColumnDef::new(Listings::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Listings::Price).gte(0))
                    .check(Expr::col(Listings::Bedrooms).gte(0))
                    .check(Expr::col(Listings::Bathrooms).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_posted_by")
                            .from(Listings::Table, Listings::PostedBy)
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_discoverable")
                    .table(Listings::Table)
                    .col(Listings::IsActive)
                    .col(Listings::Availability)
                    .col(Listings::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_posted_by")
                    .table(Listings::Table)
                    .col(Listings::PostedBy)
                    .to_owned(),
            )
            .await?;

        // listing_images
        manager
            .create_table(
                Table::create()
                    .table(ListingImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ListingImages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ListingImages::ListingId).integer().not_null())
                    .col(ColumnDef::new(ListingImages::Image).string().not_null())
                    .col(ColumnDef::new(ListingImages::Caption).string_len(200).not_null().default(""))
                    .col(
                        ColumnDef::new(ListingImages::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_images_listing")
                            .from(ListingImages::Table, ListingImages::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ListingImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await
    }
}
