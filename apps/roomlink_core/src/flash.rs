use axum::response::Redirect;
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};

const FLASH_COOKIE_NAME: &str = "_flash";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FlashData {
    pub kind: String,
    pub message: String,
}

impl FlashData {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: "success".to_owned(), message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: "error".to_owned(), message: message.into() }
    }
}

pub fn set_flash(cookies: &Cookies, data: &FlashData) {
    let Ok(json) = serde_json::to_string(data) else {
        return;
    };
    // cookie values cannot carry raw quotes or separators
    let mut cookie = Cookie::new(FLASH_COOKIE_NAME, urlencoding::encode(&json).into_owned());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);
}

/// Reads the pending flash message and clears it, so it shows once.
pub fn take_flash(cookies: &Cookies) -> Option<FlashData> {
    let raw = cookies.get(FLASH_COOKIE_NAME)?.value().to_owned();

    let mut removal = Cookie::from(FLASH_COOKIE_NAME);
    removal.set_path("/");
    cookies.remove(removal);

    let json = urlencoding::decode(&raw).ok()?;
    serde_json::from_str(&json).ok()
}

pub fn redirect_with_flash(cookies: &Cookies, to: &str, data: FlashData) -> Redirect {
    set_flash(cookies, &data);
    Redirect::to(to)
}
