//! HTTP handlers for dish and recipe endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Dish, Recipe};
use crate::services::dishes::{CreateDishInput, DishService, UpdateDishInput};
use crate::AppState;

/// Create a dish with its recipe
pub async fn create_dish(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateDishInput>,
) -> AppResult<Json<Dish>> {
    let service = DishService::new(state.db);
    let dish = service.create(current_user.0.business_id, input).await?;
    Ok(Json(dish))
}

/// List dishes with their recipes
pub async fn list_dishes(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Dish>>> {
    let service = DishService::new(state.db);
    let dishes = service.list(current_user.0.business_id).await?;
    Ok(Json(dishes))
}

/// Get a dish by id
pub async fn get_dish(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dish_id): Path<Uuid>,
) -> AppResult<Json<Dish>> {
    let service = DishService::new(state.db);
    let dish = service.get(current_user.0.business_id, dish_id).await?;
    Ok(Json(dish))
}

/// Update a dish
pub async fn update_dish(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dish_id): Path<Uuid>,
    Json(input): Json<UpdateDishInput>,
) -> AppResult<Json<Dish>> {
    let service = DishService::new(state.db);
    let dish = service
        .update(current_user.0.business_id, dish_id, input)
        .await?;
    Ok(Json(dish))
}

/// Delete a dish
pub async fn delete_dish(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(dish_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = DishService::new(state.db);
    service.delete(current_user.0.business_id, dish_id).await?;
    Ok(Json(()))
}

/// The flat recipe feed consumed by the entry screens
pub async fn list_recipes(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Recipe>>> {
    let service = DishService::new(state.db);
    let recipes = service.recipes(current_user.0.business_id).await?;
    Ok(Json(recipes))
}
