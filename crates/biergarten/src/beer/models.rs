//! Beer post data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ids;
use crate::validation::{FieldErrorKind, Validate, ValidationErrors, Validator};

pub const NAME_MAX: usize = 100;
pub const TYPE_MAX: usize = 50;
pub const DESCRIPTION_MAX: usize = 2000;
pub const IMAGE_MAX: usize = 500;
pub const ABV_MAX: f64 = 70.0;
pub const IBU_MAX: f64 = 200.0;

/// Beer post entity from database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BeerPost {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub beer_type: String,
    pub description: Option<String>,
    #[serde(rename = "brewery")]
    pub brewery_id: Option<String>,
    pub image: Option<String>,
    pub abv: Option<f64>,
    pub ibu: Option<f64>,
    pub posted_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Create or replace payload for a beer post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeerPostRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub beer_type: Option<String>,
    pub description: Option<String>,
    pub brewery: Option<String>,
    pub image: Option<String>,
    pub abv: Option<f64>,
    pub ibu: Option<f64>,
}

impl Validate for BeerPostRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required_text("name", self.name.as_deref(), 1, NAME_MAX);
        v.required_text("type", self.beer_type.as_deref(), 1, TYPE_MAX);
        v.optional_text("description", self.description.as_deref(), DESCRIPTION_MAX);
        v.optional_text("image", self.image.as_deref(), IMAGE_MAX);
        v.optional_range("abv", self.abv, 0.0, ABV_MAX);
        v.optional_range("ibu", self.ibu, 0.0, IBU_MAX);
        if let Some(brewery) = self.brewery.as_deref()
            && !ids::is_well_formed(ids::BREWERY_PREFIX, brewery)
        {
            v.push("brewery", FieldErrorKind::InvalidFormat);
        }
        v.finish()
    }
}

/// A validated beer post, ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBeerPost {
    pub name: String,
    pub beer_type: String,
    pub description: Option<String>,
    pub brewery_id: Option<String>,
    pub image: Option<String>,
    pub abv: Option<f64>,
    pub ibu: Option<f64>,
}

impl TryFrom<BeerPostRequest> for NewBeerPost {
    type Error = ValidationErrors;

    fn try_from(request: BeerPostRequest) -> Result<Self, Self::Error> {
        request.validate()?;
        Ok(Self {
            name: trimmed(request.name).unwrap_or_default(),
            beer_type: trimmed(request.beer_type).unwrap_or_default(),
            description: trimmed(request.description),
            brewery_id: request.brewery,
            image: trimmed(request.image),
            abv: request.abv,
            ibu: request.ibu,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> BeerPostRequest {
        BeerPostRequest {
            name: Some("  Helles  ".into()),
            beer_type: Some("Lager".into()),
            abv: Some(4.8),
            ibu: Some(18.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_request_converts() {
        let post = NewBeerPost::try_from(valid()).unwrap();
        assert_eq!(post.name, "Helles");
        assert_eq!(post.beer_type, "Lager");
        assert_eq!(post.description, None);
    }

    #[test]
    fn test_missing_name_and_type() {
        let errors = NewBeerPost::try_from(BeerPostRequest::default()).unwrap_err();
        assert_eq!(errors.kind_of("name"), Some(&FieldErrorKind::Required));
        assert_eq!(errors.kind_of("type"), Some(&FieldErrorKind::Required));
    }

    #[test]
    fn test_out_of_range_numbers() {
        let request = BeerPostRequest {
            abv: Some(96.0),
            ibu: Some(-1.0),
            ..valid()
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(
            errors.kind_of("abv"),
            Some(&FieldErrorKind::OutOfRange { min: 0.0, max: ABV_MAX })
        );
        assert_eq!(
            errors.kind_of("ibu"),
            Some(&FieldErrorKind::OutOfRange { min: 0.0, max: IBU_MAX })
        );
    }

    #[test]
    fn test_brewery_reference_format() {
        let request = BeerPostRequest {
            brewery: Some("not-a-brewery".into()),
            ..valid()
        };
        assert_eq!(
            request.validate().unwrap_err().kind_of("brewery"),
            Some(&FieldErrorKind::InvalidFormat)
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let post = BeerPost {
            id: "beer_abcdefghijkl".into(),
            name: "Helles".into(),
            beer_type: "Lager".into(),
            description: None,
            brewery_id: None,
            image: None,
            abv: Some(4.8),
            ibu: None,
            posted_by: "usr_abcdefghijkl".into(),
            created_at: "2024-01-01T00:00:00+00:00".into(),
            updated_at: "2024-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["type"], "Lager");
        assert_eq!(json["postedBy"], "usr_abcdefghijkl");
        assert!(json["brewery"].is_null());
    }
}
