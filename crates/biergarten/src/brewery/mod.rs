//! Breweries.

mod models;
mod repository;

pub use models::{Brewery, BreweryDetails, BreweryRequest, NewBrewery};
pub use repository::BreweryRepository;
