pub mod choices;
pub mod favorite;
pub mod listing;
pub mod listing_image;
