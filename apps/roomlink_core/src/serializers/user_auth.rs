use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::forms::{required_email, required_text, FormData, FormErrors, REQUIRED};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Cleaned registration input.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

pub struct RegistrationForm;

impl RegistrationForm {
    /// Syntactic checks only; uniqueness is checked against the store by the
    /// caller.
    pub fn clean(data: &FormData) -> Result<NewAccount, FormErrors> {
        let mut errors = FormErrors::default();

        let username = required_text(data, "username", Some(150), &mut errors);
        if !username.is_empty()
            && !username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
        let first_name = required_text(data, "first_name", Some(30), &mut errors);
        let last_name = required_text(data, "last_name", Some(30), &mut errors);
        let email = required_email(data, "email", &mut errors);

        let password1 = data.raw("password1").to_owned();
        let password2 = data.raw("password2").to_owned();
        if password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if password2.is_empty() {
            errors.add("password2", REQUIRED);
        }
        if !password1.is_empty() && !password2.is_empty() {
            if password1 != password2 {
                errors.add("password2", "The two password fields didn’t match.");
            } else {
                for msg in password_problems(&password1, &username) {
                    errors.add("password2", msg);
                }
            }
        }

        errors.into_result(NewAccount { username, first_name, last_name, email, password: password1 })
    }
}

fn password_problems(password: &str, username: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        problems.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LEN} characters."
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_owned());
    }
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        problems.push("The password is too similar to the username.".to_owned());
    }
    problems
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    /// email or username
    pub identifier: String,
    pub password: String,
}

pub struct LoginForm;

impl LoginForm {
    pub fn clean(data: &FormData) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::default();
        let identifier = required_text(data, "username", Some(254), &mut errors);
        let password = data.raw("password").to_owned();
        if password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result(Credentials { identifier, password })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}
