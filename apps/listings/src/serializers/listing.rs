use std::collections::HashMap;

use roomlink_core::forms::{
    optional_count, optional_email, optional_image, optional_text, required_choice,
    required_count, required_decimal, required_image, required_text, FormData, FormErrors,
};
use roomlink_core::media::Upload;
use rust_decimal::Decimal;
use sea_orm::ActiveEnum;

use crate::models::choices::{Availability, Furnishing, PropertyType};
use crate::models::listing;

/// A validated listing form. Only ever built by `ListingForm::clean`, so the
/// enumerations are closed and the numbers non-negative by construction.
#[derive(Debug, Clone)]
pub struct ListingInput {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub furnished: Furnishing,
    pub location: String,
    pub address: String,
    pub price: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_feet: Option<i32>,
    pub availability: Availability,
    pub contact_phone: String,
    pub contact_email: String,
    pub amenities: String,
    /// `None` keeps the current main image on edit.
    pub main_image: Option<Upload>,
}

pub struct ListingForm;

impl ListingForm {
    pub fn clean(data: &FormData) -> Result<ListingInput, FormErrors> {
        let mut errors = FormErrors::default();

        let title = required_text(data, "title", Some(200), &mut errors);
        let description = required_text(data, "description", None, &mut errors);
        let property_type = required_choice::<PropertyType>(data, "property_type", &mut errors);
        let furnished = required_choice::<Furnishing>(data, "furnished", &mut errors);
        let location = required_text(data, "location", Some(200), &mut errors);
        let address = required_text(data, "address", None, &mut errors);
        let price = required_decimal(data, "price", 10, 2, &mut errors);
        let bedrooms = required_count(data, "bedrooms", &mut errors);
        let bathrooms = required_count(data, "bathrooms", &mut errors);
        let square_feet = optional_count(data, "square_feet", &mut errors);
        let availability = required_choice::<Availability>(data, "availability", &mut errors);
        let contact_phone = optional_text(data, "contact_phone", Some(15), &mut errors);
        let contact_email = optional_email(data, "contact_email", &mut errors);
        let amenities = optional_text(data, "amenities", None, &mut errors);
        let main_image = optional_image(data, "main_image", &mut errors);

        match (property_type, furnished, availability) {
            (Some(property_type), Some(furnished), Some(availability)) if errors.is_empty() => {
                Ok(ListingInput {
                    title,
                    description,
                    property_type,
                    furnished,
                    location,
                    address,
                    price,
                    bedrooms,
                    bathrooms,
                    square_feet,
                    availability,
                    contact_phone,
                    contact_email,
                    amenities,
                    main_image,
                })
            }
            _ => Err(errors),
        }
    }

    /// Field values for an edit form pre-filled from a stored listing.
    pub fn initial(listing: &listing::Model) -> HashMap<String, String> {
        HashMap::from([
            ("title".to_owned(), listing.title.clone()),
            ("description".to_owned(), listing.description.clone()),
            ("property_type".to_owned(), listing.property_type.to_value()),
            ("furnished".to_owned(), listing.furnished.to_value()),
            ("location".to_owned(), listing.location.clone()),
            ("address".to_owned(), listing.address.clone()),
            ("price".to_owned(), listing.price.to_string()),
            ("bedrooms".to_owned(), listing.bedrooms.to_string()),
            ("bathrooms".to_owned(), listing.bathrooms.to_string()),
            (
                "square_feet".to_owned(),
                listing.square_feet.map(|n| n.to_string()).unwrap_or_default(),
            ),
            ("availability".to_owned(), listing.availability.to_value()),
            ("contact_phone".to_owned(), listing.contact_phone.clone()),
            ("contact_email".to_owned(), listing.contact_email.clone()),
            ("amenities".to_owned(), listing.amenities.clone()),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub image: Upload,
    pub caption: String,
}

pub struct ListingImageForm;

impl ListingImageForm {
    pub fn clean(data: &FormData) -> Result<NewImage, FormErrors> {
        let mut errors = FormErrors::default();
        let image = required_image(data, "image", &mut errors);
        let caption = optional_text(data, "caption", Some(200), &mut errors);
        match image {
            Some(image) if errors.is_empty() => Ok(NewImage { image, caption }),
            _ => Err(errors),
        }
    }
}
