//! Brewery data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::beer::BeerPost;
use crate::user::PublicUser;
use crate::validation::{Validate, ValidationErrors, Validator};

/// Brewery entity from database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Brewery {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub posted_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A brewery with its related records filled in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreweryDetails {
    #[serde(flatten)]
    pub brewery: Brewery,
    pub beers: Vec<BeerPost>,
    pub poster: Option<PublicUser>,
}

/// Create payload for a brewery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BreweryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl Validate for BreweryRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required_text("name", self.name.as_deref(), 1, 100);
        v.optional_text("description", self.description.as_deref(), 2000);
        v.optional_text("location", self.location.as_deref(), 200);
        v.finish()
    }
}

/// A validated brewery, ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBrewery {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl TryFrom<BreweryRequest> for NewBrewery {
    type Error = ValidationErrors;

    fn try_from(request: BreweryRequest) -> Result<Self, Self::Error> {
        request.validate()?;
        let clean = |value: Option<String>| {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Ok(Self {
            name: clean(request.name).unwrap_or_default(),
            description: clean(request.description),
            location: clean(request.location),
        })
    }
}
