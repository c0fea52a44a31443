//! Shopping list models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generated shopping list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: Uuid,
    pub business_id: Uuid,
    /// What produced the list (`low_stock` for automatic generation)
    pub generated_from: String,
    pub items: Vec<ShoppingListItem>,
    pub created_at: DateTime<Utc>,
}

/// One line of a shopping list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity_needed: Decimal,
    pub purchased: bool,
}
