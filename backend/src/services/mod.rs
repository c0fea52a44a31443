//! Business logic services for the Mise backend

pub mod auth;
pub mod dashboard;
pub mod dishes;
pub mod ingredients;
pub mod sales;
pub mod shopping_list;
pub mod suppliers;

pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use dishes::DishService;
pub use ingredients::IngredientService;
pub use sales::SaleService;
pub use shopping_list::ShoppingListService;
pub use suppliers::SupplierService;
