//! Dish and recipe models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable dish with its recipe (bill of ingredient quantities)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub ingredients: Vec<DishIngredient>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One recipe line: units of an ingredient consumed per one dish sold
///
/// Deserialization tolerates the legacy foreign-key spelling
/// `inventory_item_id` alongside `ingredientId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishIngredient {
    #[serde(alias = "inventory_item_id", alias = "inventoryItemId")]
    pub ingredient_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
}

/// A recipe as served by the flat `/recipes` feed
///
/// Consumers tolerate both `price` and the legacy `selling_price` spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    #[serde(alias = "selling_price", alias = "sellingPrice")]
    pub price: Decimal,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub ingredients: Vec<DishIngredient>,
}
