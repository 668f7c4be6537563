use serde::Serialize;

/// Payload for asynchronous favorite toggles.
#[derive(Debug, Serialize, PartialEq)]
pub struct ToggleFavoriteOut {
    pub is_favorited: bool,
    pub message: &'static str,
}

impl ToggleFavoriteOut {
    pub fn new(is_favorited: bool) -> Self {
        Self { is_favorited, message: favorite_message(is_favorited) }
    }
}

pub fn favorite_message(is_favorited: bool) -> &'static str {
    if is_favorited {
        "Added to favorites!"
    } else {
        "Removed from favorites!"
    }
}
