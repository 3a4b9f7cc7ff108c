//! Biergarten: a beer and brewery catalogue API with JWT access control.

pub mod api;
pub mod auth;
pub mod beer;
pub mod brewery;
pub mod db;
pub mod ids;
pub mod user;
pub mod validation;
