//! Application state shared across handlers.

use crate::auth::AuthState;
use crate::beer::BeerRepository;
use crate::brewery::BreweryRepository;
use crate::db::Database;
use crate::user::{UserRepository, UserService};

/// Everything a handler may need, built once at startup.
#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: AuthState,
    pub users: UserService,
    pub beers: BeerRepository,
    pub breweries: BreweryRepository,
    /// Base URL used when logging confirmation links.
    pub public_url: String,
}

impl AppState {
    pub fn new(
        db: &Database,
        auth: AuthState,
        bcrypt_cost: u32,
        public_url: impl Into<String>,
    ) -> Self {
        let pool = db.pool().clone();
        Self {
            auth,
            users: UserService::new(UserRepository::new(pool.clone()), bcrypt_cost),
            beers: BeerRepository::new(pool.clone()),
            breweries: BreweryRepository::new(pool),
            public_url: public_url.into(),
        }
    }
}
