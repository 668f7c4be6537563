use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::Serialize;

/// Human-readable name shown in selects and on listing pages.
pub trait Labelled {
    fn label(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[sea_orm(string_value = "apartment")]
    Apartment,
    #[sea_orm(string_value = "house")]
    House,
    #[sea_orm(string_value = "room")]
    Room,
    #[sea_orm(string_value = "studio")]
    Studio,
    #[sea_orm(string_value = "shared_room")]
    SharedRoom,
}

impl Labelled for PropertyType {
    fn label(&self) -> &'static str {
        match self {
            Self::Apartment => "Apartment",
            Self::House => "House",
            Self::Room => "Room",
            Self::Studio => "Studio",
            Self::SharedRoom => "Shared Room",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum Furnishing {
    #[sea_orm(string_value = "furnished")]
    Furnished,
    #[sea_orm(string_value = "semi_furnished")]
    SemiFurnished,
    #[sea_orm(string_value = "unfurnished")]
    Unfurnished,
}

impl Labelled for Furnishing {
    fn label(&self) -> &'static str {
        match self {
            Self::Furnished => "Furnished",
            Self::SemiFurnished => "Semi-Furnished",
            Self::Unfurnished => "Unfurnished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "rented")]
    Rented,
    #[sea_orm(string_value = "pending")]
    Pending,
}

impl Labelled for Availability {
    fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Rented => "Rented",
            Self::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Choice {
    pub value: String,
    pub label: &'static str,
}

/// Every variant of a closed enumeration as (stored value, label) pairs.
pub fn choices<E>() -> Vec<Choice>
where
    E: ActiveEnum<Value = String> + Iterable + Labelled,
{
    E::iter()
        .map(|choice| Choice { value: choice.to_value(), label: choice.label() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stored_values_round_trip_through_the_enumeration() {
        assert_eq!(PropertyType::SharedRoom.to_value(), "shared_room");
        assert_eq!(
            PropertyType::try_from_value(&"studio".to_owned()).unwrap(),
            PropertyType::Studio
        );
        assert!(PropertyType::try_from_value(&"castle".to_owned()).is_err());
        assert_eq!(Availability::default(), Availability::Available);
    }

    #[test]
    fn choices_list_every_variant_in_order() {
        let furnishing = choices::<Furnishing>();
        assert_eq!(
            furnishing.iter().map(|c| c.value.as_str()).collect::<Vec<_>>(),
            ["furnished", "semi_furnished", "unfurnished"]
        );
        assert_eq!(furnishing[1].label, "Semi-Furnished");
        assert_eq!(choices::<PropertyType>().len(), 5);
    }
}
