//! # Auth Module
//!
//! Staff authentication:
//! - username/password sign-in delegated to the external identity provider
//! - JWT issuance and validation
//! - `AuthedUser` extractor for protected routes
//! - password changes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::StaffUser;
pub use routes::auth_routes;
