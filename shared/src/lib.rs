//! Shared types and domain logic for the Mise restaurant platform
//!
//! This crate contains everything that is computed the same way on the
//! server and in the browser (via WASM): domain models, the inventory
//! impact aggregation, the sale entry form state machine, and validation.
//! Nothing in here performs I/O.

pub mod form;
pub mod impact;
pub mod models;
pub mod types;
pub mod validation;

pub use form::*;
pub use impact::*;
pub use models::*;
pub use types::*;
pub use validation::*;
