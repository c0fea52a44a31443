//! Sale entry form state machine
//!
//! A deterministic reducer for the batch sale entry screen. Quantity edits,
//! date changes, and submission outcomes all flow through [`SaleForm::apply`],
//! so every derived value (line totals, the submit gate) is a pure function
//! of the form state and update cycles are structurally bounded.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::SaleLine;

/// Submission lifecycle of the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Validation failures raised before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("No items to submit")]
    NoItems,
    #[error("Invalid sale date: {0}")]
    InvalidDate(String),
}

/// Events the form reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    QuantityChanged { dish_id: Uuid, quantity: i32 },
    DateChanged(String),
    SubmitRequested,
    SubmitSucceeded,
    SubmitFailed,
    Reset,
}

/// A batch that passed validation and is ready to send
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBatch {
    pub date: NaiveDate,
    pub lines: Vec<SaleLine>,
}

/// The sale entry form
#[derive(Debug, Clone, Default)]
pub struct SaleForm {
    pub date: String,
    pub quantities: HashMap<Uuid, i32>,
    pub phase: SubmissionPhase,
    pub error: Option<FormError>,
}

impl SaleForm {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    /// Apply one event and move to the next state
    pub fn apply(&mut self, event: FormEvent) {
        match event {
            FormEvent::QuantityChanged { dish_id, quantity } => {
                self.quantities.insert(dish_id, quantity);
                self.leave_terminal_phase();
            }
            FormEvent::DateChanged(date) => {
                self.date = date;
                self.leave_terminal_phase();
            }
            FormEvent::SubmitRequested => {
                self.phase = SubmissionPhase::Validating;
                match self.validate() {
                    Ok(_) => {
                        self.error = None;
                        self.phase = SubmissionPhase::Submitting;
                    }
                    Err(err) => {
                        // Rejected before anything leaves the client; entered
                        // quantities stay put.
                        self.error = Some(err);
                        self.phase = SubmissionPhase::Idle;
                    }
                }
            }
            FormEvent::SubmitSucceeded => {
                self.quantities.clear();
                self.error = None;
                self.phase = SubmissionPhase::Succeeded;
            }
            FormEvent::SubmitFailed => {
                // Quantities are preserved so the user can retry as-is.
                self.error = None;
                self.phase = SubmissionPhase::Failed;
            }
            FormEvent::Reset => {
                self.quantities.clear();
                self.error = None;
                self.phase = SubmissionPhase::Idle;
            }
        }
    }

    /// Validate the current state into a submittable batch.
    ///
    /// Lines are ordered by dish id so the submission order is stable.
    pub fn validate(&self) -> Result<ValidatedBatch, FormError> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(self.date.clone()))?;

        let mut lines: Vec<SaleLine> = self
            .quantities
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .map(|(dish_id, quantity)| SaleLine {
                dish_id: *dish_id,
                quantity: *quantity,
            })
            .collect();
        lines.sort_by_key(|line| line.dish_id);

        if lines.is_empty() {
            return Err(FormError::NoItems);
        }

        Ok(ValidatedBatch { date, lines })
    }

    /// Total amount of the current entries given per-dish prices.
    /// Dishes without a known price contribute nothing.
    pub fn total_amount(&self, prices: &HashMap<Uuid, Decimal>) -> Decimal {
        self.quantities
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .filter_map(|(dish_id, quantity)| {
                prices
                    .get(dish_id)
                    .map(|price| *price * Decimal::from(*quantity))
            })
            .sum()
    }

    fn leave_terminal_phase(&mut self) {
        if matches!(
            self.phase,
            SubmissionPhase::Succeeded | SubmissionPhase::Failed
        ) {
            self.phase = SubmissionPhase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn uid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn all_zero_quantities_are_rejected_before_submit() {
        let mut form = SaleForm::new("2025-06-01");
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(1),
            quantity: 0,
        });
        form.apply(FormEvent::SubmitRequested);

        assert_eq!(form.phase, SubmissionPhase::Idle);
        assert_eq!(form.error, Some(FormError::NoItems));
        // entered values survive the rejection
        assert_eq!(form.quantities.get(&uid(1)), Some(&0));
    }

    #[test]
    fn bad_date_is_rejected() {
        let mut form = SaleForm::new("01/06/2025");
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(1),
            quantity: 2,
        });
        form.apply(FormEvent::SubmitRequested);

        assert_eq!(form.phase, SubmissionPhase::Idle);
        assert!(matches!(form.error, Some(FormError::InvalidDate(_))));
    }

    #[test]
    fn valid_form_moves_to_submitting() {
        let mut form = SaleForm::new("2025-06-01");
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(1),
            quantity: 2,
        });
        form.apply(FormEvent::SubmitRequested);

        assert_eq!(form.phase, SubmissionPhase::Submitting);
        assert_eq!(form.error, None);
    }

    #[test]
    fn validate_drops_non_positive_lines() {
        let mut form = SaleForm::new("2025-06-01");
        form.quantities.insert(uid(1), 3);
        form.quantities.insert(uid(2), 0);
        form.quantities.insert(uid(3), -1);

        let batch = form.validate().unwrap();
        assert_eq!(batch.lines.len(), 1);
        assert_eq!(batch.lines[0].dish_id, uid(1));
        assert_eq!(batch.lines[0].quantity, 3);
    }

    #[test]
    fn success_clears_the_form_failure_keeps_it() {
        let mut form = SaleForm::new("2025-06-01");
        form.quantities.insert(uid(1), 3);

        let mut failed = form.clone();
        failed.apply(FormEvent::SubmitFailed);
        assert_eq!(failed.phase, SubmissionPhase::Failed);
        assert_eq!(failed.quantities.get(&uid(1)), Some(&3));

        form.apply(FormEvent::SubmitSucceeded);
        assert_eq!(form.phase, SubmissionPhase::Succeeded);
        assert!(form.quantities.is_empty());
    }

    #[test]
    fn editing_after_a_terminal_phase_returns_to_idle() {
        let mut form = SaleForm::new("2025-06-01");
        form.apply(FormEvent::SubmitFailed);
        form.apply(FormEvent::QuantityChanged {
            dish_id: uid(1),
            quantity: 1,
        });
        assert_eq!(form.phase, SubmissionPhase::Idle);
    }

    #[test]
    fn total_amount_ignores_unknown_dishes() {
        let mut form = SaleForm::new("2025-06-01");
        form.quantities.insert(uid(1), 2);
        form.quantities.insert(uid(2), 1);

        let mut prices = HashMap::new();
        prices.insert(uid(1), dec("9.50"));

        assert_eq!(form.total_amount(&prices), dec("19.00"));
    }
}
