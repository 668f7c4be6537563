use std::sync::Arc;

use listings::models::choices::{Availability, Furnishing, PropertyType};
use listings::models::{favorite, listing, listing_image};
use listings::serializers::listing::ListingInput;
use listings::service::filter::{self, SearchCriteria};
use listings::service::pagination::{paginate, PAGE_SIZE};
use listings::service::{Mutation, Query};
use pretty_assertions::assert_eq;
use roomlink_core::{
    accounts, config::Settings, connect, ensure_schema, media::LocalImageStore, models::user,
    serializers::user_auth::NewAccount, AppState,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, Set,
};

async fn setup() -> AppState {
    let db = connect("sqlite::memory:").await.unwrap();
    ensure_schema(&db).await.unwrap();
    let media = Arc::new(LocalImageStore::new(std::env::temp_dir().join("roomlink-tests"), "/media"));
    AppState::new(db, tera::Tera::default(), media, Settings::default())
}

async fn make_user(db: &DatabaseConnection, username: &str) -> user::Model {
    accounts::create_account(
        db,
        NewAccount {
            username: username.to_owned(),
            first_name: "Wanjiru".to_owned(),
            last_name: "Kamau".to_owned(),
            email: format!("{username}@example.com"),
            password: "correct-horse".to_owned(),
        },
    )
    .await
    .unwrap()
}

fn input(title: &str, location: &str, property_type: PropertyType, price: i64, bedrooms: i32) -> ListingInput {
    ListingInput {
        title: title.to_owned(),
        description: "Spacious and secure.".to_owned(),
        property_type,
        furnished: Furnishing::Unfurnished,
        location: location.to_owned(),
        address: "Off Ngong Rd".to_owned(),
        price: Decimal::new(price, 0),
        bedrooms,
        bathrooms: 1,
        square_feet: None,
        availability: Availability::Available,
        contact_phone: "+254700000000".to_owned(),
        contact_email: String::new(),
        amenities: "Parking".to_owned(),
        main_image: None,
    }
}

async fn post(db: &DatabaseConnection, owner: &user::Model, data: ListingInput) -> listing::Model {
    Mutation::create_listing(db, owner.id, &data, None).await.unwrap()
}

async fn set_state(db: &DatabaseConnection, l: listing::Model, active: bool, availability: Availability) {
    let mut am = l.into_active_model();
    am.is_active = Set(active);
    am.availability = Set(availability);
    am.update(db).await.unwrap();
}

async fn ids(db: &DatabaseConnection, criteria: &SearchCriteria) -> Vec<i32> {
    filter::search(criteria)
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect()
}

fn satisfies(l: &listing::Model, c: &SearchCriteria) -> bool {
    l.is_active
        && l.availability == Availability::Available
        && c.location
            .as_ref()
            .map_or(true, |loc| l.location.to_lowercase().contains(&loc.to_lowercase()))
        && c.property_type.map_or(true, |pt| l.property_type == pt)
        && c.min_price.map_or(true, |min| l.price >= min)
        && c.max_price.map_or(true, |max| l.price <= max)
        && c.min_bedrooms.map_or(true, |n| l.bedrooms >= n)
}

#[tokio::test]
async fn no_criteria_lists_discoverable_listings_newest_first() {
    let state = setup().await;
    let db = &state.db;
    let owner = make_user(db, "landlord").await;

    let a = post(db, &owner, input("A", "Kilimani", PropertyType::Apartment, 30000, 2)).await;
    let b = post(db, &owner, input("B", "Westlands", PropertyType::House, 90000, 4)).await;
    let rented = post(db, &owner, input("C", "Kileleshwa", PropertyType::Studio, 20000, 0)).await;
    let hidden = post(db, &owner, input("D", "Lavington", PropertyType::Room, 12000, 1)).await;
    let d = post(db, &owner, input("E", "South B", PropertyType::SharedRoom, 8000, 1)).await;
    set_state(db, rented, true, Availability::Rented).await;
    set_state(db, hidden, false, Availability::Available).await;

    assert_eq!(ids(db, &SearchCriteria::default()).await, vec![d.id, b.id, a.id]);
}

#[tokio::test]
async fn filter_agrees_with_a_direct_scan() {
    let state = setup().await;
    let db = &state.db;
    let owner = make_user(db, "landlord").await;

    let fixtures = [
        ("Kilimani", PropertyType::Apartment, 35000, 2),
        ("kilimani estate", PropertyType::Studio, 18000, 0),
        ("Westlands", PropertyType::Apartment, 55000, 3),
        ("Westlands", PropertyType::House, 120000, 5),
        ("South C", PropertyType::Room, 9000, 1),
        ("Kileleshwa", PropertyType::Apartment, 40000, 2),
        ("Rongai", PropertyType::SharedRoom, 6000, 1),
        ("100% Kilimani", PropertyType::House, 75000, 4),
    ];
    for (i, (location, pt, price, beds)) in fixtures.into_iter().enumerate() {
        let l = post(db, &owner, input(&format!("L{i}"), location, pt, price, beds)).await;
        match i {
            3 => set_state(db, l, true, Availability::Pending).await,
            5 => set_state(db, l, false, Availability::Available).await,
            _ => {}
        }
    }
    let everything = listing::Entity::find().all(db).await.unwrap();

    let cases = [
        SearchCriteria { location: Some("KILIMANI".into()), ..Default::default() },
        SearchCriteria { location: Some("%".into()), ..Default::default() },
        SearchCriteria { location: Some("west".into()), min_bedrooms: Some(3), ..Default::default() },
        SearchCriteria { property_type: Some(PropertyType::Apartment), ..Default::default() },
        SearchCriteria {
            min_price: Some(Decimal::new(9000, 0)),
            max_price: Some(Decimal::new(55000, 0)),
            ..Default::default()
        },
        SearchCriteria { min_price: Some(Decimal::ZERO), min_bedrooms: Some(0), ..Default::default() },
        SearchCriteria {
            location: Some("kili".into()),
            property_type: Some(PropertyType::Apartment),
            min_price: Some(Decimal::new(30000, 0)),
            max_price: Some(Decimal::new(40000, 0)),
            min_bedrooms: Some(2),
        },
        SearchCriteria { max_price: Some(Decimal::new(1000, 0)), ..Default::default() },
    ];

    for criteria in cases {
        let mut expected: Vec<i32> = everything
            .iter()
            .filter(|l| satisfies(l, &criteria))
            .map(|l| l.id)
            .collect();
        expected.reverse();
        assert_eq!(ids(db, &criteria).await, expected, "{criteria:?}");
    }
}

#[tokio::test]
async fn non_ascii_locations_are_folded_the_same_on_both_sides() {
    let state = setup().await;
    let db = &state.db;
    let owner = make_user(db, "landlord").await;

    let l = post(db, &owner, input("Flat", "Östra Kilimani", PropertyType::Apartment, 30000, 2)).await;

    for needle in ["Östra", "ÖSTRA KILIMANI", "Östra kILIMANI"] {
        let criteria = SearchCriteria { location: Some(needle.into()), ..Default::default() };
        assert_eq!(ids(db, &criteria).await, vec![l.id], "{needle}");
    }
}

#[tokio::test]
async fn thirteen_listings_make_two_pages() {
    let state = setup().await;
    let db = &state.db;
    let owner = make_user(db, "landlord").await;

    let empty = paginate(db, filter::search(&SearchCriteria::default()), None, PAGE_SIZE)
        .await
        .unwrap();
    assert_eq!((empty.number, empty.num_pages, empty.total), (1, 1, 0));
    assert!(empty.items.is_empty() && !empty.has_next && !empty.has_previous);

    for i in 0..13 {
        post(db, &owner, input(&format!("Unit {i}"), "Kasarani", PropertyType::Room, 7000, 1)).await;
    }
    let all = filter::search(&SearchCriteria::default());

    let first = paginate(db, all.clone(), Some("1"), PAGE_SIZE).await.unwrap();
    assert_eq!(first.items.len(), 12);
    assert!(first.has_next && !first.has_previous);
    assert_eq!((first.num_pages, first.total, first.next_page_number), (2, 13, Some(2)));

    let second = paginate(db, all.clone(), Some("2"), PAGE_SIZE).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(!second.has_next && second.has_previous);
    assert_eq!(second.previous_page_number, Some(1));

    let clamped = paginate(db, all.clone(), Some("99"), PAGE_SIZE).await.unwrap();
    assert_eq!(clamped.number, 2);
    assert_eq!(clamped.items, second.items);

    let junk = paginate(db, all, Some("abc"), PAGE_SIZE).await.unwrap();
    assert_eq!(junk.number, 1);
}

#[tokio::test]
async fn toggling_twice_restores_state() {
    let state = setup().await;
    let db = &state.db;
    let owner = make_user(db, "landlord").await;
    let tenant = make_user(db, "tenant").await;
    let l = post(db, &owner, input("Loft", "Kilimani", PropertyType::Apartment, 30000, 1)).await;

    assert!(!Query::is_favorited(db, tenant.id, l.id).await.unwrap());
    assert!(Mutation::toggle_favorite(db, tenant.id, l.id).await.unwrap());
    assert!(Query::is_favorited(db, tenant.id, l.id).await.unwrap());
    assert!(!Mutation::toggle_favorite(db, tenant.id, l.id).await.unwrap());
    assert!(!Query::is_favorited(db, tenant.id, l.id).await.unwrap());

    for _ in 0..5 {
        Mutation::toggle_favorite(db, tenant.id, l.id).await.unwrap();
        let rows = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(tenant.id))
            .filter(favorite::Column::ListingId.eq(l.id))
            .count(db)
            .await
            .unwrap();
        assert!(rows <= 1);
    }

    let favs = Query::favorites_of(db, tenant.id).await.unwrap();
    assert_eq!(favs.len(), 1);
    assert_eq!(favs[0].1.id, l.id);
}

#[tokio::test]
async fn foreign_listing_looks_missing() {
    let state = setup().await;
    let db = &state.db;
    let owner = make_user(db, "landlord").await;
    let other = make_user(db, "someone").await;
    let l = post(db, &owner, input("Loft", "Kilimani", PropertyType::Apartment, 30000, 1)).await;

    assert_eq!(Query::find_owned(db, l.id, other.id).await.unwrap(), None);
    assert_eq!(Query::find_owned(db, 9999, other.id).await.unwrap(), None);
    assert_eq!(
        Query::find_owned(db, l.id, owner.id).await.unwrap().map(|f| f.id),
        Some(l.id)
    );

    assert!(!Mutation::delete_owned(db, l.id, other.id).await.unwrap());
    assert!(!Mutation::delete_owned(db, 9999, other.id).await.unwrap());
    assert!(listing::Entity::find_by_id(l.id).one(db).await.unwrap().is_some());

    assert!(Mutation::delete_owned(db, l.id, owner.id).await.unwrap());
    assert!(listing::Entity::find_by_id(l.id).one(db).await.unwrap().is_none());
}

#[tokio::test]
async fn edits_keep_the_main_image_unless_replaced() {
    let state = setup().await;
    let db = &state.db;
    let owner = make_user(db, "landlord").await;
    let l = Mutation::create_listing(
        db,
        owner.id,
        &input("Loft", "Kilimani", PropertyType::Apartment, 30000, 1),
        Some("listing_images/a.jpg".to_owned()),
    )
    .await
    .unwrap();

    let mut changed = input("Loft v2", "Kilimani", PropertyType::Studio, 28000, 1);
    changed.square_feet = Some(450);
    let updated = Mutation::update_listing(db, l, &changed, None).await.unwrap();
    assert_eq!(updated.title, "Loft v2");
    assert_eq!(updated.property_type, PropertyType::Studio);
    assert_eq!(updated.square_feet, Some(450));
    assert_eq!(updated.main_image.as_deref(), Some("listing_images/a.jpg"));

    let replaced = Mutation::update_listing(db, updated, &changed, Some("listing_images/b.jpg".into()))
        .await
        .unwrap();
    assert_eq!(replaced.main_image.as_deref(), Some("listing_images/b.jpg"));
}

#[tokio::test]
async fn deleting_a_listing_takes_its_images_and_favorites() {
    let state = setup().await;
    let db = &state.db;
    let owner = make_user(db, "landlord").await;
    let tenant = make_user(db, "tenant").await;
    let l = post(db, &owner, input("Loft", "Kilimani", PropertyType::Apartment, 30000, 1)).await;

    Mutation::add_image(db, l.id, "listing_images/1.jpg".into(), "Kitchen".into()).await.unwrap();
    Mutation::add_image(db, l.id, "listing_images/2.jpg".into(), String::new()).await.unwrap();
    Mutation::toggle_favorite(db, tenant.id, l.id).await.unwrap();

    let gallery = Query::images_for(db, l.id).await.unwrap();
    assert_eq!(
        gallery.iter().map(|i| i.image.as_str()).collect::<Vec<_>>(),
        ["listing_images/1.jpg", "listing_images/2.jpg"]
    );

    assert!(Mutation::delete_owned(db, l.id, owner.id).await.unwrap());
    assert_eq!(listing_image::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(favorite::Entity::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_a_user_takes_their_listings() {
    let state = setup().await;
    let db = &state.db;
    let owner = make_user(db, "landlord").await;
    let keeper = make_user(db, "keeper").await;
    post(db, &owner, input("A", "Kilimani", PropertyType::Apartment, 30000, 1)).await;
    post(db, &owner, input("B", "Kilimani", PropertyType::Apartment, 31000, 1)).await;
    let kept = post(db, &keeper, input("C", "Karen", PropertyType::House, 150000, 5)).await;

    assert_eq!(Query::listings_by(db, owner.id).await.unwrap().len(), 2);
    owner.delete(db).await.unwrap();

    let left = listing::Entity::find().all(db).await.unwrap();
    assert_eq!(left.iter().map(|l| l.id).collect::<Vec<_>>(), vec![kept.id]);
}
