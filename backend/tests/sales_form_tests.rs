//! Sale submission state machine tests
//!
//! The submission flow is `idle -> validating -> submitting ->
//! success | failure`. These tests pin the gate conditions (nothing leaves
//! the client with an empty or unparseable batch) and the terminal-state
//! behavior (success clears the form, failure keeps it for retry).

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::form::{FormError, FormEvent, SaleForm, SubmissionPhase};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn uid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Submitting with every quantity at zero is rejected before any
    /// network call would happen
    #[test]
    fn test_zero_quantities_rejected() {
        let mut form = SaleForm::new("2025-06-01");
        for n in 1..=3 {
            form.apply(FormEvent::QuantityChanged {
                dish_id: uid(n),
                quantity: 0,
            });
        }
        form.apply(FormEvent::SubmitRequested);

        assert_eq!(form.phase, SubmissionPhase::Idle);
        assert_eq!(form.error, Some(FormError::NoItems));
    }

    /// An unparseable date is rejected in the validating step
    #[test]
    fn test_invalid_date_rejected() {
        let mut form = SaleForm::new("June 1st");
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(1),
            quantity: 2,
        });
        form.apply(FormEvent::SubmitRequested);

        assert_eq!(form.phase, SubmissionPhase::Idle);
        assert!(matches!(form.error, Some(FormError::InvalidDate(_))));
    }

    /// The happy path reaches the submitting phase with a clean batch
    #[test]
    fn test_valid_batch_submits() {
        let mut form = SaleForm::new("2025-06-01");
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(2),
            quantity: 3,
        });
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(1),
            quantity: 1,
        });
        form.apply(FormEvent::SubmitRequested);

        assert_eq!(form.phase, SubmissionPhase::Submitting);

        let batch = form.validate().unwrap();
        assert_eq!(batch.lines.len(), 2);
        // lines come out ordered by dish id
        assert_eq!(batch.lines[0].dish_id, uid(1));
        assert_eq!(batch.lines[1].dish_id, uid(2));
    }

    /// Success clears entered quantities; failure preserves them
    #[test]
    fn test_terminal_states() {
        let mut form = SaleForm::new("2025-06-01");
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(1),
            quantity: 4,
        });

        let mut failed = form.clone();
        failed.apply(FormEvent::SubmitFailed);
        assert_eq!(failed.phase, SubmissionPhase::Failed);
        assert_eq!(failed.quantities.get(&uid(1)), Some(&4));

        form.apply(FormEvent::SubmitSucceeded);
        assert_eq!(form.phase, SubmissionPhase::Succeeded);
        assert!(form.quantities.is_empty());
    }

    /// Totals come from price times quantity over the positive lines only
    #[test]
    fn test_total_amount() {
        let mut form = SaleForm::new("2025-06-01");
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(1),
            quantity: 2,
        });
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(2),
            quantity: 0,
        });

        let mut prices = HashMap::new();
        prices.insert(uid(1), dec("9.50"));
        prices.insert(uid(2), dec("4.00"));

        assert_eq!(form.total_amount(&prices), dec("19.00"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantities_strategy() -> impl Strategy<Value = Vec<(u128, i32)>> {
        prop::collection::vec(((1u128..=10u128), -5i32..=20i32), 0..8)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// A batch validates iff at least one line is positive (given a
        /// well-formed date)
        #[test]
        fn prop_submit_gate(entries in quantities_strategy()) {
            let mut form = SaleForm::new("2025-06-01");
            for (dish, quantity) in &entries {
                form.apply(FormEvent::QuantityChanged {
                    dish_id: uid(*dish),
                    quantity: *quantity,
                });
            }

            // last write per dish wins, matching the reducer
            let mut latest: HashMap<Uuid, i32> = HashMap::new();
            for (dish, quantity) in &entries {
                latest.insert(uid(*dish), *quantity);
            }
            let any_positive = latest.values().any(|q| *q > 0);

            match form.validate() {
                Ok(batch) => {
                    prop_assert!(any_positive);
                    prop_assert!(batch.lines.iter().all(|l| l.quantity > 0));
                }
                Err(FormError::NoItems) => prop_assert!(!any_positive),
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }

        /// The total never counts non-positive lines and is additive in
        /// prices
        #[test]
        fn prop_total_matches_reference(entries in quantities_strategy()) {
            let mut form = SaleForm::new("2025-06-01");
            let mut prices = HashMap::new();
            for (dish, quantity) in &entries {
                form.apply(FormEvent::QuantityChanged {
                    dish_id: uid(*dish),
                    quantity: *quantity,
                });
                prices.insert(uid(*dish), Decimal::new(*dish as i64 * 100, 2));
            }

            let expected: Decimal = form
                .quantities
                .iter()
                .filter(|(_, q)| **q > 0)
                .map(|(dish, q)| prices[dish] * Decimal::from(*q))
                .sum();

            prop_assert_eq!(form.total_amount(&prices), expected);
        }

        /// Submit-request never lands in a terminal phase directly
        #[test]
        fn prop_submit_phase_is_idle_or_submitting(entries in quantities_strategy()) {
            let mut form = SaleForm::new("2025-06-01");
            for (dish, quantity) in entries {
                form.apply(FormEvent::QuantityChanged {
                    dish_id: uid(dish),
                    quantity,
                });
            }
            form.apply(FormEvent::SubmitRequested);

            prop_assert!(matches!(
                form.phase,
                SubmissionPhase::Idle | SubmissionPhase::Submitting
            ));
        }
    }
}
