//! HTTP handlers for dashboard endpoints
//!
//! These are the cached read models: they never fail outward, they degrade
//! to the last known values.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::middleware::CurrentUser;
use crate::models::LowStockItem;
use crate::services::dashboard::{DashboardService, DashboardSummary, RevenuePoint, TopDishEntry};
use crate::AppState;

/// Query for the revenue series endpoint
#[derive(Debug, Deserialize)]
pub struct RevenueSeriesQuery {
    pub days: Option<i32>,
}

/// Query for the top-dishes endpoint
#[derive(Debug, Deserialize)]
pub struct TopDishesQuery {
    pub limit: Option<i64>,
}

/// Headline numbers for the overview screen
pub async fn get_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Json<DashboardSummary> {
    let service = DashboardService::new(state.db, state.caches);
    Json(service.summary(current_user.0.business_id).await)
}

/// Daily revenue for the chart (default: last 7 days)
pub async fn get_revenue_series(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RevenueSeriesQuery>,
) -> Json<Vec<RevenuePoint>> {
    let days = query.days.unwrap_or(7).clamp(1, 365);
    let service = DashboardService::new(state.db, state.caches);
    Json(service.revenue_series(current_user.0.business_id, days).await)
}

/// Best-selling dishes (default: top 5)
pub async fn get_top_dishes(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<TopDishesQuery>,
) -> Json<Vec<TopDishEntry>> {
    let limit = query.limit.unwrap_or(5).clamp(1, 50);
    let service = DashboardService::new(state.db, state.caches);
    Json(service.top_dishes(current_user.0.business_id, limit).await)
}

/// The cached low-stock set for the dashboard widget
pub async fn get_low_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Json<Vec<LowStockItem>> {
    let service = DashboardService::new(state.db, state.caches);
    Json(service.low_stock(current_user.0.business_id).await)
}
