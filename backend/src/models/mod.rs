//! Database models for the Mise backend
//!
//! Re-exports models from the shared crate; backend-specific row shapes live
//! next to the services that query them.

pub use shared::models::*;
