// src/applications/mod.rs

pub mod export;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod ranking;
pub mod routes;
pub mod services;
pub mod sorting;
pub mod subjects;
pub mod view;

#[cfg(test)]
mod tests;

pub use models::{Application, ApplicationsSnapshot, SelectionMeta, SubjectEntry};
pub use routes::applications_routes;
