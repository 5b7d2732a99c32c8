//! HTTP surface over the helper router.
//!
//! Exposes each helper as a `POST` endpoint plus the master helper's
//! memory. See [`routes`] for the full route table.

pub mod routes;

pub use routes::{app_router, AppState};
