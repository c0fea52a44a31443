//! WebAssembly module for the Mise restaurant platform
//!
//! Provides client-side computation for:
//! - Inventory impact of a batch of dish sales
//! - Low/out-of-stock classification
//! - Sale totals and warning formatting
//! - Offline form validation
//!
//! Quantity edits in the entry screens recompute everything here
//! synchronously; the server repeats the same computation on submit.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::impact::*;
pub use shared::models::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Aggregate per-ingredient consumption for a batch of dish sales.
///
/// `sold_json` is a map of dish id to quantity sold; `recipes_json` is a map
/// of dish id to its recipe lines. Returns the impact items as a JSON array.
#[wasm_bindgen]
pub fn calculate_impact(sold_json: &str, recipes_json: &str) -> Result<String, JsValue> {
    let sold: HashMap<Uuid, i32> = serde_json::from_str(sold_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid sold JSON: {}", e)))?;
    let recipes: HashMap<Uuid, Vec<DishIngredient>> = serde_json::from_str(recipes_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid recipes JSON: {}", e)))?;

    let impact = calculate_inventory_impact(&sold, &recipes);
    let mut items: Vec<&ImpactItem> = impact.values().collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));

    serde_json::to_string(&items)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Classify an ingredient's projected stock position.
/// Returns "ok", "low_stock", or "out_of_stock" (out-of-stock wins).
#[wasm_bindgen]
pub fn classify_stock_level(current_stock: f64, minimum_stock: f64, quantity_used: f64) -> String {
    let current = Decimal::from_f64_retain(current_stock).unwrap_or_default();
    let minimum = Decimal::from_f64_retain(minimum_stock).unwrap_or_default();
    let used = Decimal::from_f64_retain(quantity_used).unwrap_or_default();

    let remaining = project_remaining(current, used);
    match classify_stock(remaining, minimum) {
        StockStatus::Ok => "ok".to_string(),
        StockStatus::LowStock => "low_stock".to_string(),
        StockStatus::OutOfStock => "out_of_stock".to_string(),
    }
}

/// Projected remaining stock after consumption, clamped at zero
#[wasm_bindgen]
pub fn remaining_stock(current_stock: f64, quantity_used: f64) -> f64 {
    let current = Decimal::from_f64_retain(current_stock).unwrap_or_default();
    let used = Decimal::from_f64_retain(quantity_used).unwrap_or_default();
    project_remaining(current, used)
        .to_string()
        .parse()
        .unwrap_or(0.0)
}

/// Line total for one dish entry
#[wasm_bindgen]
pub fn sale_line_total(unit_price: f64, quantity: i32) -> f64 {
    if quantity <= 0 {
        return 0.0;
    }
    let price = Decimal::from_f64_retain(unit_price).unwrap_or_default();
    (price * Decimal::from(quantity))
        .to_string()
        .parse()
        .unwrap_or(0.0)
}

/// Validate a sale date in `YYYY-MM-DD`
#[wasm_bindgen]
pub fn is_valid_sale_date(date: &str) -> bool {
    validate_sale_date(date).is_ok()
}

/// Render a stock quantity for warnings, one decimal place
#[wasm_bindgen]
pub fn format_stock_quantity(value: f64) -> String {
    format_quantity(Decimal::from_f64_retain(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_stock_level() {
        // stock 10, minimum 3, selling 4 dishes at 2 units each
        assert_eq!(classify_stock_level(10.0, 3.0, 8.0), "low_stock");
        // exact depletion
        assert_eq!(classify_stock_level(10.0, 3.0, 10.0), "out_of_stock");
        // plenty left
        assert_eq!(classify_stock_level(10.0, 3.0, 2.0), "ok");
        // remaining equals the minimum: not low stock
        assert_eq!(classify_stock_level(10.0, 3.0, 7.0), "ok");
    }

    #[test]
    fn test_remaining_stock_clamps() {
        assert_eq!(remaining_stock(5.0, 8.0), 0.0);
        assert_eq!(remaining_stock(8.0, 5.0), 3.0);
    }

    #[test]
    fn test_sale_line_total() {
        assert_eq!(sale_line_total(9.5, 2), 19.0);
        assert_eq!(sale_line_total(9.5, 0), 0.0);
        assert_eq!(sale_line_total(9.5, -3), 0.0);
    }

    #[test]
    fn test_is_valid_sale_date() {
        assert!(is_valid_sale_date("2025-06-01"));
        assert!(!is_valid_sale_date("01/06/2025"));
        assert!(!is_valid_sale_date(""));
    }

    #[test]
    fn test_calculate_impact_round_trip() {
        let dish = "11111111-1111-1111-1111-111111111111";
        let ingredient = "22222222-2222-2222-2222-222222222222";
        let sold = format!("{{\"{}\": 4}}", dish);
        let recipes = format!(
            "{{\"{}\": [{{\"ingredientId\": \"{}\", \"name\": \"Flour\", \"unit\": \"g\", \"quantity\": \"2\"}}]}}",
            dish, ingredient
        );

        let out = calculate_impact(&sold, &recipes).unwrap();
        let items: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["quantityUsed"], "8");
        assert_eq!(items[0]["name"], "Flour");
    }

    #[test]
    fn test_format_stock_quantity() {
        assert_eq!(format_stock_quantity(1.25), "1.3");
        assert_eq!(format_stock_quantity(6.0), "6.0");
    }
}
