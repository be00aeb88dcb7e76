//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own validation and the provider calls so route handlers
//! can stay focused on request parsing and cookie plumbing. Services return
//! `AppError` so handlers can pass failures straight through.

pub mod auth;
pub mod organization;
pub mod profile;
