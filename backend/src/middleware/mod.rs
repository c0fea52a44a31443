//! HTTP middleware for the Mise backend

mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
