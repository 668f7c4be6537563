pub mod favorite;
pub mod listing;
pub mod search;
