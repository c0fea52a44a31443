//! Inventory impact aggregation and low-stock assessment
//!
//! Turns a set of sold-dish quantities into per-ingredient consumption,
//! projects the remaining stock of each ingredient, and classifies the
//! result. Everything here is pure: same inputs, same outputs.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DishIngredient, LowStockItem};

/// Projected consumption of a single ingredient across a batch of sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactItem {
    pub ingredient_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity_used: Decimal,
}

/// Stock position of an ingredient at assessment time
///
/// An ingredient with no inventory record defaults to zero stock and a zero
/// minimum, which classifies as out of stock but never as low stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub current_stock: Decimal,
    pub minimum_stock: Decimal,
}

/// Badge shown for an ingredient's projected stock position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Ok,
    LowStock,
    OutOfStock,
}

/// An aggregated impact item joined with the ingredient's stock position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientShortage {
    pub ingredient_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity_used: Decimal,
    pub current_stock: Decimal,
    pub minimum_stock: Decimal,
    pub remaining: Decimal,
    pub low_stock: bool,
    pub out_of_stock: bool,
}

/// Aggregate per-ingredient consumption for a batch of dish sales.
///
/// Only entries with `quantity > 0` contribute; a dish id with no recipe is
/// skipped silently. Quantities are summed per ingredient across all dishes.
/// The ingredient's display name and unit come from the first dish that
/// mentions it; dishes are visited in ascending id order so that choice is
/// deterministic (the sums never depend on visit order).
pub fn calculate_inventory_impact(
    sold: &HashMap<Uuid, i32>,
    recipes: &HashMap<Uuid, Vec<DishIngredient>>,
) -> HashMap<Uuid, ImpactItem> {
    let mut impact: HashMap<Uuid, ImpactItem> = HashMap::new();

    let mut dish_ids: Vec<&Uuid> = sold.keys().collect();
    dish_ids.sort();

    for dish_id in dish_ids {
        let quantity = sold[dish_id];
        if quantity <= 0 {
            continue;
        }
        let lines = match recipes.get(dish_id) {
            Some(lines) => lines,
            None => continue,
        };
        for line in lines {
            let used = line.quantity * Decimal::from(quantity);
            impact
                .entry(line.ingredient_id)
                .and_modify(|item| item.quantity_used += used)
                .or_insert_with(|| ImpactItem {
                    ingredient_id: line.ingredient_id,
                    name: line.name.clone(),
                    unit: line.unit.clone(),
                    quantity_used: used,
                });
        }
    }

    impact
}

/// Projected stock after consumption, clamped at zero
pub fn project_remaining(current_stock: Decimal, quantity_used: Decimal) -> Decimal {
    (current_stock - quantity_used).max(Decimal::ZERO)
}

/// Low stock iff the projected remainder is strictly below the minimum.
/// `remaining == minimum` is not low stock.
pub fn is_low_stock(remaining: Decimal, minimum_stock: Decimal) -> bool {
    remaining < minimum_stock
}

/// Out of stock iff nothing (or less) would remain
pub fn is_out_of_stock(remaining: Decimal) -> bool {
    remaining <= Decimal::ZERO
}

/// Badge for a projected remainder; out-of-stock wins over low-stock
pub fn classify_stock(remaining: Decimal, minimum_stock: Decimal) -> StockStatus {
    if is_out_of_stock(remaining) {
        StockStatus::OutOfStock
    } else if is_low_stock(remaining, minimum_stock) {
        StockStatus::LowStock
    } else {
        StockStatus::Ok
    }
}

/// Join aggregated consumption with stock levels and classify each ingredient.
///
/// Ingredients missing from `levels` are assessed against `StockLevel::default()`.
/// Results are sorted by ingredient name for stable display.
pub fn assess_shortages(
    impact: &HashMap<Uuid, ImpactItem>,
    levels: &HashMap<Uuid, StockLevel>,
) -> Vec<IngredientShortage> {
    let mut shortages: Vec<IngredientShortage> = impact
        .values()
        .map(|item| {
            let level = levels.get(&item.ingredient_id).copied().unwrap_or_default();
            let remaining = project_remaining(level.current_stock, item.quantity_used);
            IngredientShortage {
                ingredient_id: item.ingredient_id,
                name: item.name.clone(),
                unit: item.unit.clone(),
                quantity_used: item.quantity_used,
                current_stock: level.current_stock,
                minimum_stock: level.minimum_stock,
                remaining,
                low_stock: is_low_stock(remaining, level.minimum_stock),
                out_of_stock: is_out_of_stock(remaining),
            }
        })
        .collect();

    shortages.sort_by(|a, b| a.name.cmp(&b.name).then(a.ingredient_id.cmp(&b.ingredient_id)));
    shortages
}

/// Quantity to buy to bring an ingredient back to its reorder level
pub fn restock_quantity(quantity: Decimal, reorder_level: Decimal) -> Decimal {
    (reorder_level - quantity).max(Decimal::ZERO)
}

/// Render a stock quantity for user-facing warnings, one decimal place
pub fn format_quantity(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.1}", rounded)
}

/// Build the user-facing warning for a non-empty low-stock set, listing
/// ingredient names with their remaining quantities
pub fn low_stock_warning(items: &[LowStockItem]) -> String {
    let listed: Vec<String> = items
        .iter()
        .map(|item| {
            format!(
                "{} ({} {} left)",
                item.name,
                format_quantity(item.quantity),
                item.unit
            )
        })
        .collect();
    format!("Low stock: {}", listed.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn line(ingredient: Uuid, name: &str, unit: &str, quantity: &str) -> DishIngredient {
        DishIngredient {
            ingredient_id: ingredient,
            name: name.to_string(),
            unit: unit.to_string(),
            quantity: dec(quantity),
        }
    }

    #[test]
    fn non_positive_quantities_yield_empty_impact() {
        let mut recipes = HashMap::new();
        recipes.insert(uid(1), vec![line(uid(10), "Flour", "g", "200")]);

        let mut sold = HashMap::new();
        sold.insert(uid(1), 0);

        assert!(calculate_inventory_impact(&sold, &recipes).is_empty());

        sold.insert(uid(1), -3);
        assert!(calculate_inventory_impact(&sold, &recipes).is_empty());
    }

    #[test]
    fn unknown_dish_contributes_nothing() {
        let mut recipes = HashMap::new();
        recipes.insert(uid(1), vec![line(uid(10), "Flour", "g", "200")]);

        let mut sold = HashMap::new();
        sold.insert(uid(2), 5);

        assert!(calculate_inventory_impact(&sold, &recipes).is_empty());
    }

    #[test]
    fn usage_is_summed_across_dishes() {
        let mut recipes = HashMap::new();
        recipes.insert(
            uid(1),
            vec![
                line(uid(10), "Flour", "g", "200"),
                line(uid(11), "Egg", "pcs", "2"),
            ],
        );
        recipes.insert(uid(2), vec![line(uid(10), "Flour", "g", "150")]);

        let mut sold = HashMap::new();
        sold.insert(uid(1), 2);
        sold.insert(uid(2), 3);

        let impact = calculate_inventory_impact(&sold, &recipes);
        // 200*2 + 150*3 = 850
        assert_eq!(impact[&uid(10)].quantity_used, dec("850"));
        assert_eq!(impact[&uid(11)].quantity_used, dec("4"));
    }

    #[test]
    fn name_and_unit_come_from_lowest_dish_id() {
        // The same ingredient id carries different metadata in two dishes;
        // the dish with the lower id wins regardless of map insertion order.
        let mut recipes = HashMap::new();
        recipes.insert(uid(9), vec![line(uid(10), "Plain flour", "kg", "1")]);
        recipes.insert(uid(2), vec![line(uid(10), "Flour", "g", "200")]);

        let mut sold = HashMap::new();
        sold.insert(uid(9), 1);
        sold.insert(uid(2), 1);

        let impact = calculate_inventory_impact(&sold, &recipes);
        let item = &impact[&uid(10)];
        assert_eq!(item.name, "Flour");
        assert_eq!(item.unit, "g");
        assert_eq!(item.quantity_used, dec("201"));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let mut recipes = HashMap::new();
        recipes.insert(uid(1), vec![line(uid(10), "Flour", "g", "200")]);

        let mut sold = HashMap::new();
        sold.insert(uid(1), 4);

        let first = calculate_inventory_impact(&sold, &recipes);
        let second = calculate_inventory_impact(&sold, &recipes);
        assert_eq!(first, second);
    }

    #[test]
    fn remaining_is_clamped_at_zero() {
        assert_eq!(project_remaining(dec("5"), dec("8")), Decimal::ZERO);
        assert_eq!(project_remaining(dec("8"), dec("5")), dec("3"));
    }

    #[test]
    fn low_stock_boundary() {
        // remaining == minimum is NOT low stock
        assert!(!is_low_stock(dec("3"), dec("3")));
        // just below the minimum IS low stock
        assert!(is_low_stock(dec("2.9"), dec("3")));
        // zero remaining is low stock and out of stock at the same time
        assert!(is_low_stock(Decimal::ZERO, dec("3")));
        assert!(is_out_of_stock(Decimal::ZERO));
    }

    #[test]
    fn low_stock_badge_scenario() {
        // Dish uses 2 units per serving, stock 10, minimum 3, sell 4:
        // consumes 8, remaining 2 -> Low Stock, not Out of Stock.
        let remaining = project_remaining(dec("10"), dec("2") * Decimal::from(4));
        assert_eq!(remaining, dec("2"));
        assert_eq!(classify_stock(remaining, dec("3")), StockStatus::LowStock);
    }

    #[test]
    fn out_of_stock_badge_scenario() {
        // Selling 5 servings needing 10 units against stock 10 depletes it.
        let remaining = project_remaining(dec("10"), dec("2") * Decimal::from(5));
        assert_eq!(remaining, Decimal::ZERO);
        assert_eq!(classify_stock(remaining, dec("3")), StockStatus::OutOfStock);
    }

    #[test]
    fn missing_stock_record_defaults_to_zero() {
        let mut recipes = HashMap::new();
        recipes.insert(uid(1), vec![line(uid(10), "Saffron", "g", "1")]);

        let mut sold = HashMap::new();
        sold.insert(uid(1), 2);

        let impact = calculate_inventory_impact(&sold, &recipes);
        let shortages = assess_shortages(&impact, &HashMap::new());

        assert_eq!(shortages.len(), 1);
        let s = &shortages[0];
        assert_eq!(s.remaining, Decimal::ZERO);
        // 0 < 0 is false: never low stock, but depleted by definition
        assert!(!s.low_stock);
        assert!(s.out_of_stock);
    }

    #[test]
    fn shortages_are_sorted_by_name() {
        let mut impact = HashMap::new();
        for (id, name) in [(uid(10), "Flour"), (uid(11), "Egg"), (uid(12), "Butter")] {
            impact.insert(
                id,
                ImpactItem {
                    ingredient_id: id,
                    name: name.to_string(),
                    unit: "g".to_string(),
                    quantity_used: dec("1"),
                },
            );
        }
        let shortages = assess_shortages(&impact, &HashMap::new());
        let names: Vec<&str> = shortages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Butter", "Egg", "Flour"]);
    }

    #[test]
    fn restock_quantity_never_negative() {
        assert_eq!(restock_quantity(dec("2"), dec("10")), dec("8"));
        assert_eq!(restock_quantity(dec("12"), dec("10")), Decimal::ZERO);
    }

    #[test]
    fn warning_lists_names_with_one_decimal() {
        let items = vec![
            LowStockItem {
                ingredient_id: uid(10),
                name: "Flour".to_string(),
                unit: "kg".to_string(),
                quantity: dec("1.25"),
                reorder_level: dec("5"),
            },
            LowStockItem {
                ingredient_id: uid(11),
                name: "Eggs".to_string(),
                unit: "pcs".to_string(),
                quantity: dec("6"),
                reorder_level: dec("24"),
            },
        ];
        assert_eq!(
            low_stock_warning(&items),
            "Low stock: Flour (1.3 kg left), Eggs (6.0 pcs left)"
        );
    }
}
