//! HTTP handlers for ingredient inventory endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Ingredient, LowStockItem, StockDelta};
use crate::services::dashboard::DashboardCaches;
use crate::services::ingredients::{
    CreateIngredientInput, IngredientService, UpdateIngredientInput,
};
use crate::AppState;

/// Create an ingredient
pub async fn create_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateIngredientInput>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db);
    let ingredient = service.create(current_user.0.business_id, input).await?;
    Ok(Json(ingredient))
}

/// List ingredients
pub async fn list_ingredients(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Ingredient>>> {
    let service = IngredientService::new(state.db);
    let ingredients = service.list(current_user.0.business_id).await?;
    Ok(Json(ingredients))
}

/// Get an ingredient by id
pub async fn get_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db);
    let ingredient = service
        .get(current_user.0.business_id, ingredient_id)
        .await?;
    Ok(Json(ingredient))
}

/// Update an ingredient
pub async fn update_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<UpdateIngredientInput>,
) -> AppResult<Json<Ingredient>> {
    let service = IngredientService::new(state.db);
    let ingredient = service
        .update(current_user.0.business_id, ingredient_id, input)
        .await?;
    Ok(Json(ingredient))
}

/// Delete an ingredient
pub async fn delete_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = IngredientService::new(state.db);
    service
        .delete(current_user.0.business_id, ingredient_id)
        .await?;
    Ok(Json(()))
}

/// The coarse low-stock list (`quantity < reorder_level`)
pub async fn list_low_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<LowStockItem>>> {
    let service = IngredientService::new(state.db);
    let items = service.list_low_stock(current_user.0.business_id).await?;
    Ok(Json(items))
}

/// Request body for batched stock adjustments
#[derive(Debug, Deserialize)]
pub struct StockAdjustmentInput {
    pub deltas: Vec<StockDelta>,
}

/// Apply a batch of signed stock deltas (restocks and corrections)
pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<StockAdjustmentInput>,
) -> AppResult<Json<()>> {
    let business_id = current_user.0.business_id;
    let service = IngredientService::new(state.db.clone());
    service
        .apply_stock_deltas(business_id, &input.deltas)
        .await?;

    // Stock moved, so the cached low-stock widget is stale
    state
        .caches
        .low_stock
        .invalidate(&DashboardCaches::low_stock_key(business_id))
        .await;

    Ok(Json(()))
}
