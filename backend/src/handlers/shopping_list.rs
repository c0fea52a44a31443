//! HTTP handlers for shopping list endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::ShoppingList;
use crate::services::ingredients::IngredientService;
use crate::services::shopping_list::{SetPurchasedInput, ShoppingListService};
use crate::AppState;

/// Generate a shopping list from the current low-stock set
pub async fn generate_shopping_list(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ShoppingList>> {
    let ingredients = IngredientService::new(state.db.clone());
    let items = ingredients
        .list_low_stock(current_user.0.business_id)
        .await?;

    let service = ShoppingListService::new(state.db);
    let list = service
        .generate_from_low_stock(current_user.0.business_id, &items)
        .await?;
    Ok(Json(list))
}

/// List shopping lists, newest first
pub async fn list_shopping_lists(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ShoppingList>>> {
    let service = ShoppingListService::new(state.db);
    let lists = service.list(current_user.0.business_id).await?;
    Ok(Json(lists))
}

/// Get one shopping list with its items
pub async fn get_shopping_list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(list_id): Path<Uuid>,
) -> AppResult<Json<ShoppingList>> {
    let service = ShoppingListService::new(state.db);
    let list = service.get(current_user.0.business_id, list_id).await?;
    Ok(Json(list))
}

/// Delete a shopping list
pub async fn delete_shopping_list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(list_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ShoppingListService::new(state.db);
    service.delete(current_user.0.business_id, list_id).await?;
    Ok(Json(()))
}

/// Mark a shopping list item as purchased (or not)
pub async fn set_item_purchased(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((list_id, item_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<SetPurchasedInput>,
) -> AppResult<Json<crate::models::ShoppingListItem>> {
    let service = ShoppingListService::new(state.db);
    let item = service
        .set_purchased(
            current_user.0.business_id,
            list_id,
            item_id,
            input.purchased,
        )
        .await?;
    Ok(Json(item))
}
