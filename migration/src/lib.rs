pub use sea_orm_migration::prelude::*;

mod m2025_10_20_000001_create_users;
mod m2025_10_20_000002_create_sessions;
mod m2025_10_20_000003_create_user_profiles;
mod m2025_10_20_000004_create_listings;
mod m2025_10_20_000005_create_favorites;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        // foreign keys point backwards: users first, favorites last
        vec![
            Box::new(m2025_10_20_000001_create_users::Migration),
            Box::new(m2025_10_20_000002_create_sessions::Migration),
            Box::new(m2025_10_20_000003_create_user_profiles::Migration),
            Box::new(m2025_10_20_000004_create_listings::Migration),
            Box::new(m2025_10_20_000005_create_favorites::Migration),
        ]
    }
}
