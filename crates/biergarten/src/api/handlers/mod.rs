//! HTTP request handlers.

mod beers;
mod breweries;
mod misc;
mod users;

use axum::extract::FromRequest;

use super::error::{ApiError, ApiResult};
use crate::ids;

pub use beers::{create_beer, delete_beer, get_beer, list_beers, update_beer};
pub use breweries::{create_brewery, get_brewery, list_breweries};
pub use misc::{health, not_found, teapot, verify_token};
pub use users::{confirm_account, get_user, login, register};

/// JSON body whose rejections use the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Reject path ids that could never have been issued.
fn ensure_id(prefix: &str, id: &str, what: &str) -> ApiResult<()> {
    if ids::is_well_formed(prefix, id) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("Invalid {what} id: {id}")))
    }
}
