//! Beer posts.

mod models;
mod repository;

pub use models::{BeerPost, BeerPostRequest, NewBeerPost};
pub use repository::BeerRepository;
