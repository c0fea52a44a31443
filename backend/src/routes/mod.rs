//! Route definitions for the Mise backend

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - business profile
        .nest("/profile", profile_routes())
        // Protected routes - dish and recipe management
        .nest("/dishes", dish_routes())
        // Flat recipe feed (protected)
        .route(
            "/recipes",
            get(handlers::list_recipes).route_layer(middleware::from_fn(auth_middleware)),
        )
        // Protected routes - ingredient inventory
        .nest("/ingredients", ingredient_routes())
        // Protected routes - supplier management
        .nest("/suppliers", supplier_routes())
        // Protected routes - sales entry and history
        .nest("/sales", sale_routes())
        // Protected routes - dashboard read models
        .nest("/dashboard", dashboard_routes())
        // Protected routes - shopping lists
        .nest("/shopping-lists", shopping_list_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route(
            "/me",
            get(handlers::get_me).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Business profile routes (protected)
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_business_profile).put(handlers::update_business_profile),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Dish management routes (protected)
fn dish_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_dishes).post(handlers::create_dish))
        .route(
            "/:dish_id",
            get(handlers::get_dish)
                .put(handlers::update_dish)
                .delete(handlers::delete_dish),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Ingredient inventory routes (protected)
fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route("/low-stock", get(handlers::list_low_stock))
        .route("/stock-adjustments", post(handlers::adjust_stock))
        .route(
            "/:ingredient_id",
            get(handlers::get_ingredient)
                .put(handlers::update_ingredient)
                .delete(handlers::delete_ingredient),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier management routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sales routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales))
        .route("/submit", post(handlers::submit_sales))
        .route("/impact", post(handlers::preview_impact))
        .route("/export", get(handlers::export_sales))
        .route(
            "/:sale_id",
            put(handlers::update_sale).delete(handlers::delete_sale),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/revenue-series", get(handlers::get_revenue_series))
        .route("/top-dishes", get(handlers::get_top_dishes))
        .route("/low-stock", get(handlers::get_low_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Shopping list routes (protected)
fn shopping_list_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_shopping_lists).post(handlers::generate_shopping_list),
        )
        .route(
            "/:list_id",
            get(handlers::get_shopping_list).delete(handlers::delete_shopping_list),
        )
        .route(
            "/:list_id/items/:item_id",
            put(handlers::set_item_purchased),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
