//! Business profile models
//!
//! The business profile is the tenant boundary: every row in the system is
//! scoped by its `business_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Business types supported by the platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    Restaurant,
    Cafe,
    Bakery,
    FoodTruck,
    /// Delivery-only operation without a dining room
    CloudKitchen,
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::Restaurant => "restaurant",
            BusinessType::Cafe => "cafe",
            BusinessType::Bakery => "bakery",
            BusinessType::FoodTruck => "food_truck",
            BusinessType::CloudKitchen => "cloud_kitchen",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "restaurant" => Some(BusinessType::Restaurant),
            "cafe" => Some(BusinessType::Cafe),
            "bakery" => Some(BusinessType::Bakery),
            "food_truck" => Some(BusinessType::FoodTruck),
            "cloud_kitchen" => Some(BusinessType::CloudKitchen),
            _ => None,
        }
    }
}

/// A registered business profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub id: Uuid,
    pub name: String,
    pub business_type: BusinessType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a new business with its owner account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBusinessInput {
    pub business_name: String,
    pub business_type: BusinessType,
    pub owner_name: String,
    pub email: String,
    pub password: String,
}
