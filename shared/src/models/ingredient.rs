//! Ingredient and stock level models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inventory ingredient
///
/// `quantity` is the current stock on hand in `unit`. `reorder_level` drives
/// the coarse low-stock query and shopping list generation;
/// `minimum_stock_level` drives the per-sale impact warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Uuid,
    pub business_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub cost: Decimal,
    pub reorder_level: Decimal,
    pub minimum_stock_level: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of the coarse low-stock query (`quantity < reorder_level`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub ingredient_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub reorder_level: Decimal,
}

/// A signed stock adjustment applied to one ingredient
///
/// Negative `delta` consumes stock (sales), positive restocks (deliveries).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDelta {
    pub ingredient_id: Uuid,
    pub delta: Decimal,
}
