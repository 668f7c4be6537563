//! Form plumbing shared by every app: a request extractor that accepts both
//! urlencoded and multipart bodies, a field-error map, and field cleaners that
//! mirror the usual web-form rules (trimmed text, max lengths, non-negative
//! numbers, closed choices, image uploads).

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use rust_decimal::Decimal;
use sea_orm::ActiveEnum;
use serde::Serialize;
use validator::ValidateEmail;

use crate::error::AppError;
use crate::media::Upload;

pub const REQUIRED: &str = "This field is required.";
pub const NON_FIELD: &str = "__all__";

#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl FormData {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect(),
            files: HashMap::new(),
        }
    }

    pub fn with_file(mut self, name: &str, upload: Upload) -> Self {
        self.files.insert(name.to_owned(), upload);
        self
    }

    /// Trimmed value, empty when absent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }

    /// Raw value, for fields that must not be trimmed (passwords).
    pub fn raw(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn checkbox(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .is_some_and(|v| !matches!(v.trim(), "" | "0" | "false" | "False" | "off"))
    }

    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files.get(name)
    }

    /// Submitted text values, for re-rendering a form after a failed post.
    pub fn values(&self) -> &HashMap<String, String> {
        &self.fields
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Self { fields, files: HashMap::new() });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let mut data = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match field.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    // an untouched file input still sends an empty part
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    data.files.insert(
                        name,
                        Upload { file_name: Some(file_name), content_type, data: bytes },
                    );
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    data.fields.insert(name, value);
                }
            }
        }
        Ok(data)
    }
}

/// Field name -> messages. Non-field errors go under `__all__`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

// ---------- field cleaners ----------

fn check_len(field: &str, value: &str, max_len: usize, errors: &mut FormErrors) {
    let len = value.chars().count();
    if len > max_len {
        errors.add(
            field,
            format!("Ensure this value has at most {max_len} characters (it has {len})."),
        );
    }
}

pub fn required_text(data: &FormData, field: &str, max_len: Option<usize>, errors: &mut FormErrors) -> String {
    let value = data.text(field);
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if let Some(max) = max_len {
        check_len(field, value, max, errors);
    }
    value.to_owned()
}

pub fn optional_text(data: &FormData, field: &str, max_len: Option<usize>, errors: &mut FormErrors) -> String {
    let value = data.text(field);
    if let Some(max) = max_len {
        check_len(field, value, max, errors);
    }
    value.to_owned()
}

pub fn optional_email(data: &FormData, field: &str, errors: &mut FormErrors) -> String {
    let value = data.text(field);
    if !value.is_empty() {
        if !value.validate_email() {
            errors.add(field, "Enter a valid email address.");
        } else {
            check_len(field, value, 254, errors);
        }
    }
    value.to_owned()
}

pub fn required_email(data: &FormData, field: &str, errors: &mut FormErrors) -> String {
    if data.text(field).is_empty() {
        errors.add(field, REQUIRED);
        return String::new();
    }
    optional_email(data, field, errors)
}

/// Any non-negative decimal, with no limit on digits.
pub fn optional_non_negative_decimal(data: &FormData, field: &str, errors: &mut FormErrors) -> Option<Decimal> {
    let raw = data.text(field);
    if raw.is_empty() {
        return None;
    }
    let Ok(value) = Decimal::from_str(raw) else {
        errors.add(field, "Enter a number.");
        return None;
    };
    if value.is_sign_negative() && !value.is_zero() {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
        return None;
    }
    Some(value.normalize())
}

/// Decimal with at most `max_digits` digits and `decimal_places` after the
/// point, and never negative.
pub fn optional_decimal(
    data: &FormData,
    field: &str,
    max_digits: u32,
    decimal_places: u32,
    errors: &mut FormErrors,
) -> Option<Decimal> {
    let value = optional_non_negative_decimal(data, field, errors)?;
    let scale = value.scale();
    let whole_digits = value.trunc().abs().to_string().trim_start_matches('0').len() as u32;
    if scale > decimal_places {
        errors.add(field, format!("Ensure that there are no more than {decimal_places} decimal places."));
        return None;
    }
    if whole_digits + scale > max_digits {
        errors.add(field, format!("Ensure that there are no more than {max_digits} digits in total."));
        return None;
    }
    if whole_digits > max_digits - decimal_places {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_digits - decimal_places
            ),
        );
        return None;
    }
    Some(value)
}

pub fn required_decimal(
    data: &FormData,
    field: &str,
    max_digits: u32,
    decimal_places: u32,
    errors: &mut FormErrors,
) -> Decimal {
    if data.text(field).is_empty() {
        errors.add(field, REQUIRED);
        return Decimal::ZERO;
    }
    optional_decimal(data, field, max_digits, decimal_places, errors).unwrap_or(Decimal::ZERO)
}

/// Whole number in `0..=i32::MAX`.
pub fn optional_count(data: &FormData, field: &str, errors: &mut FormErrors) -> Option<i32> {
    let raw = data.text(field);
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Err(_) => {
            errors.add(field, "Enter a whole number.");
            None
        }
        Ok(n) if n < 0 => {
            errors.add(field, "Ensure this value is greater than or equal to 0.");
            None
        }
        Ok(n) => match i32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                errors.add(field, format!("Ensure this value is less than or equal to {}.", i32::MAX));
                None
            }
        },
    }
}

pub fn required_count(data: &FormData, field: &str, errors: &mut FormErrors) -> i32 {
    if data.text(field).is_empty() {
        errors.add(field, REQUIRED);
        return 0;
    }
    optional_count(data, field, errors).unwrap_or(0)
}

/// One of the string values of a closed enumeration.
pub fn optional_choice<E>(data: &FormData, field: &str, errors: &mut FormErrors) -> Option<E>
where
    E: ActiveEnum<Value = String>,
{
    let raw = data.text(field);
    if raw.is_empty() {
        return None;
    }
    match E::try_from_value(&raw.to_owned()) {
        Ok(choice) => Some(choice),
        Err(_) => {
            errors.add(
                field,
                format!("Select a valid choice. {raw} is not one of the available choices."),
            );
            None
        }
    }
}

pub fn required_choice<E>(data: &FormData, field: &str, errors: &mut FormErrors) -> Option<E>
where
    E: ActiveEnum<Value = String>,
{
    if data.text(field).is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    optional_choice(data, field, errors)
}

pub fn optional_image(data: &FormData, field: &str, errors: &mut FormErrors) -> Option<Upload> {
    let upload = data.file(field)?;
    if !upload.is_image() {
        errors.add(
            field,
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
        );
        return None;
    }
    Some(upload.clone())
}

pub fn required_image(data: &FormData, field: &str, errors: &mut FormErrors) -> Option<Upload> {
    if data.file(field).is_none() {
        errors.add(field, REQUIRED);
        return None;
    }
    optional_image(data, field, errors)
}
