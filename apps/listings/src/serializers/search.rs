use roomlink_core::forms::{optional_choice, optional_count, optional_non_negative_decimal, FormData, FormErrors};

use crate::service::filter::SearchCriteria;

pub struct SearchForm;

impl SearchForm {
    /// Blank and zero fields impose no constraint. An invalid form yields no
    /// criteria at all, together with the errors to show next to the fields.
    pub fn clean(data: &FormData) -> (SearchCriteria, FormErrors) {
        let mut errors = FormErrors::default();
        let location = data.text("location");
        let criteria = SearchCriteria {
            location: (!location.is_empty()).then(|| location.to_owned()),
            property_type: optional_choice(data, "property_type", &mut errors),
            min_price: optional_non_negative_decimal(data, "min_price", &mut errors).filter(|p| !p.is_zero()),
            max_price: optional_non_negative_decimal(data, "max_price", &mut errors).filter(|p| !p.is_zero()),
            min_bedrooms: optional_count(data, "bedrooms", &mut errors).filter(|&n| n != 0),
        };
        if errors.is_empty() {
            (criteria, errors)
        } else {
            (SearchCriteria::default(), errors)
        }
    }
}
