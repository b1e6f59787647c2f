// src/selections/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


pub use models::SelectionKey;
pub use routes::selections_routes;
pub use services::SelectionService;
