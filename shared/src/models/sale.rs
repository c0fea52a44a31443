//! Sales models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded sale of one dish on one date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleEntry {
    pub id: Uuid,
    pub business_id: Uuid,
    pub user_id: Option<Uuid>,
    pub dish_id: Uuid,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// One line of a batch submission: how many units of a dish were sold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub dish_id: Uuid,
    pub quantity: i32,
}
