//! Dashboard client
//!
//! Holds a staff member's applications, optimistic selections and view state,
//! and keeps them reconciled with the server.

pub mod backend;
pub mod refresh;
pub mod selection_store;
pub mod store;


pub use backend::{DashboardBackend, DashboardError, HttpBackend};
pub use refresh::spawn_refresh_loop;
pub use selection_store::{KeyState, SelectionStore};
pub use store::{Dashboard, DashboardSettings};
