//! User accounts.
//!
//! Registration, login and account confirmation on top of the `users` table.

mod models;
mod repository;
mod service;

pub use models::{LoginRequest, NewUser, PublicUser, RegisterRequest, User, UserInfo};
pub use repository::{CreateUserError, UserRepository};
pub use service::{UserError, UserService};
