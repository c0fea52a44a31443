//! HTTP handlers for the Mise backend

mod auth;
mod dashboard;
mod dishes;
mod health;
mod ingredients;
mod sales;
mod shopping_list;
mod suppliers;

pub use auth::*;
pub use dashboard::*;
pub use dishes::*;
pub use health::*;
pub use ingredients::*;
pub use sales::*;
pub use shopping_list::*;
pub use suppliers::*;
