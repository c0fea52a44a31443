//! Inventory impact aggregation tests
//!
//! Covers the pipeline that turns sold-dish quantities into per-ingredient
//! consumption:
//! - aggregation totals and commutativity
//! - low-stock / out-of-stock boundaries
//! - the badge scenarios for the sales screens

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::impact::{
    assess_shortages, calculate_inventory_impact, classify_stock, is_low_stock, is_out_of_stock,
    project_remaining, StockLevel, StockStatus,
};
use shared::models::DishIngredient;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn uid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn line(ingredient: Uuid, quantity: &str) -> DishIngredient {
    DishIngredient {
        ingredient_id: ingredient,
        name: format!("ingredient-{}", ingredient.as_u128()),
        unit: "g".to_string(),
        quantity: dec(quantity),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Non-positive quantities never contribute
    #[test]
    fn test_non_positive_entries_ignored() {
        let mut recipes = HashMap::new();
        recipes.insert(uid(1), vec![line(uid(10), "2")]);
        recipes.insert(uid(2), vec![line(uid(10), "5")]);

        let mut sold = HashMap::new();
        sold.insert(uid(1), 0);
        sold.insert(uid(2), -2);

        assert!(calculate_inventory_impact(&sold, &recipes).is_empty());
    }

    /// A dish with no recipe contributes nothing, and does not fail
    #[test]
    fn test_unknown_dish_skipped() {
        let recipes = HashMap::new();
        let mut sold = HashMap::new();
        sold.insert(uid(1), 3);

        assert!(calculate_inventory_impact(&sold, &recipes).is_empty());
    }

    /// The worked scenario from the sales screens: 2 units per serving,
    /// stock 10, minimum 3, selling 4 servings
    #[test]
    fn test_low_stock_badge_scenario() {
        let mut recipes = HashMap::new();
        recipes.insert(uid(1), vec![line(uid(10), "2")]);

        let mut sold = HashMap::new();
        sold.insert(uid(1), 4);

        let impact = calculate_inventory_impact(&sold, &recipes);
        assert_eq!(impact[&uid(10)].quantity_used, dec("8"));

        let mut levels = HashMap::new();
        levels.insert(
            uid(10),
            StockLevel {
                current_stock: dec("10"),
                minimum_stock: dec("3"),
            },
        );

        let shortages = assess_shortages(&impact, &levels);
        assert_eq!(shortages.len(), 1);
        let s = &shortages[0];
        assert_eq!(s.remaining, dec("2"));
        assert!(s.low_stock);
        assert!(!s.out_of_stock);
        assert_eq!(
            classify_stock(s.remaining, s.minimum_stock),
            StockStatus::LowStock
        );
    }

    /// Selling 5 servings (10 units) against stock 10 depletes it
    #[test]
    fn test_out_of_stock_badge_scenario() {
        let mut recipes = HashMap::new();
        recipes.insert(uid(1), vec![line(uid(10), "2")]);

        let mut sold = HashMap::new();
        sold.insert(uid(1), 5);

        let impact = calculate_inventory_impact(&sold, &recipes);
        let mut levels = HashMap::new();
        levels.insert(
            uid(10),
            StockLevel {
                current_stock: dec("10"),
                minimum_stock: dec("3"),
            },
        );

        let shortages = assess_shortages(&impact, &levels);
        let s = &shortages[0];
        assert_eq!(s.remaining, Decimal::ZERO);
        assert!(s.out_of_stock);
        // zero remaining is also below the minimum
        assert!(s.low_stock);
        assert_eq!(
            classify_stock(s.remaining, s.minimum_stock),
            StockStatus::OutOfStock
        );
    }

    /// remaining == minimum is not low stock; just below is
    #[test]
    fn test_low_stock_boundary() {
        assert!(!is_low_stock(dec("3"), dec("3")));
        assert!(is_low_stock(dec("2.999"), dec("3")));
        assert!(!is_out_of_stock(dec("0.001")));
        assert!(is_out_of_stock(Decimal::ZERO));
    }

    /// An ingredient without an inventory record reads as zero stock with a
    /// zero minimum: never low stock, shown as depleted
    #[test]
    fn test_missing_inventory_record_defaults() {
        let mut recipes = HashMap::new();
        recipes.insert(uid(1), vec![line(uid(10), "1")]);

        let mut sold = HashMap::new();
        sold.insert(uid(1), 2);

        let impact = calculate_inventory_impact(&sold, &recipes);
        let shortages = assess_shortages(&impact, &HashMap::new());

        let s = &shortages[0];
        assert_eq!(s.current_stock, Decimal::ZERO);
        assert_eq!(s.minimum_stock, Decimal::ZERO);
        assert_eq!(s.remaining, Decimal::ZERO);
        assert!(!s.low_stock);
        assert!(s.out_of_stock);
    }

    /// Shared ingredients accumulate across dishes
    #[test]
    fn test_shared_ingredient_sums() {
        let mut recipes = HashMap::new();
        recipes.insert(uid(1), vec![line(uid(10), "2"), line(uid(11), "1")]);
        recipes.insert(uid(2), vec![line(uid(10), "3")]);

        let mut sold = HashMap::new();
        sold.insert(uid(1), 2);
        sold.insert(uid(2), 4);

        let impact = calculate_inventory_impact(&sold, &recipes);
        // 2*2 + 3*4 = 16
        assert_eq!(impact[&uid(10)].quantity_used, dec("16"));
        assert_eq!(impact[&uid(11)].quantity_used, dec("2"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for recipe quantities (0.1 to 100.0)
    fn recipe_quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1000i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Strategy for sold quantities, including the non-positive ones the
    /// aggregation must ignore
    fn sold_quantity_strategy() -> impl Strategy<Value = i32> {
        -5i32..=50i32
    }

    /// Strategy for a batch: a handful of dishes, each with a small recipe
    /// over a shared pool of ingredients
    fn batch_strategy() -> impl Strategy<
        Value = (
            Vec<(u128, i32)>,
            Vec<(u128, Vec<(u128, Decimal)>)>,
        ),
    > {
        let recipe = prop::collection::vec(
            ((1u128..=6u128), recipe_quantity_strategy()),
            1..4,
        );
        let recipes = prop::collection::vec(((1u128..=8u128), recipe), 1..6);
        let sold = prop::collection::vec(((1u128..=8u128), sold_quantity_strategy()), 1..6);
        (sold, recipes)
    }

    fn build_inputs(
        sold_raw: &[(u128, i32)],
        recipes_raw: &[(u128, Vec<(u128, Decimal)>)],
    ) -> (HashMap<Uuid, i32>, HashMap<Uuid, Vec<DishIngredient>>) {
        let mut sold = HashMap::new();
        for (dish, quantity) in sold_raw {
            sold.insert(uid(*dish), *quantity);
        }
        let mut recipes = HashMap::new();
        for (dish, lines) in recipes_raw {
            let lines = lines
                .iter()
                .map(|(ingredient, quantity)| DishIngredient {
                    ingredient_id: uid(*ingredient),
                    name: format!("ingredient-{}", ingredient),
                    unit: "g".to_string(),
                    quantity: *quantity,
                })
                .collect();
            recipes.insert(uid(*dish), lines);
        }
        (sold, recipes)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Per-ingredient totals equal the sum over dishes of
        /// per-dish-quantity times quantity-sold
        #[test]
        fn prop_totals_match_reference((sold_raw, recipes_raw) in batch_strategy()) {
            let (sold, recipes) = build_inputs(&sold_raw, &recipes_raw);
            let impact = calculate_inventory_impact(&sold, &recipes);

            // Independent reference computation
            let mut expected: HashMap<Uuid, Decimal> = HashMap::new();
            for (dish_id, quantity) in &sold {
                if *quantity <= 0 {
                    continue;
                }
                if let Some(lines) = recipes.get(dish_id) {
                    for l in lines {
                        *expected.entry(l.ingredient_id).or_insert(Decimal::ZERO) +=
                            l.quantity * Decimal::from(*quantity);
                    }
                }
            }

            prop_assert_eq!(impact.len(), expected.len());
            for (ingredient_id, total) in expected {
                prop_assert_eq!(impact[&ingredient_id].quantity_used, total);
            }
        }

        /// The aggregation is a pure function: running it twice gives the
        /// same result
        #[test]
        fn prop_idempotent((sold_raw, recipes_raw) in batch_strategy()) {
            let (sold, recipes) = build_inputs(&sold_raw, &recipes_raw);
            let first = calculate_inventory_impact(&sold, &recipes);
            let second = calculate_inventory_impact(&sold, &recipes);
            prop_assert_eq!(first, second);
        }

        /// All-non-positive batches produce an empty impact map
        #[test]
        fn prop_non_positive_is_empty(
            (mut sold_raw, recipes_raw) in batch_strategy()
        ) {
            for (_, quantity) in sold_raw.iter_mut() {
                *quantity = -quantity.abs();
            }
            let (sold, recipes) = build_inputs(&sold_raw, &recipes_raw);
            prop_assert!(calculate_inventory_impact(&sold, &recipes).is_empty());
        }

        /// Projection never goes below zero and never exceeds current stock
        #[test]
        fn prop_remaining_bounded(
            current in (0i64..=100000i64).prop_map(|n| Decimal::new(n, 2)),
            used in (0i64..=100000i64).prop_map(|n| Decimal::new(n, 2)),
        ) {
            let remaining = project_remaining(current, used);
            prop_assert!(remaining >= Decimal::ZERO);
            prop_assert!(remaining <= current);
        }

        /// Exactly one badge per projected position, with out-of-stock
        /// taking precedence
        #[test]
        fn prop_badge_consistent(
            remaining in (0i64..=10000i64).prop_map(|n| Decimal::new(n, 2)),
            minimum in (0i64..=10000i64).prop_map(|n| Decimal::new(n, 2)),
        ) {
            let badge = classify_stock(remaining, minimum);
            if is_out_of_stock(remaining) {
                prop_assert_eq!(badge, StockStatus::OutOfStock);
            } else if is_low_stock(remaining, minimum) {
                prop_assert_eq!(badge, StockStatus::LowStock);
            } else {
                prop_assert_eq!(badge, StockStatus::Ok);
            }
        }
    }
}
