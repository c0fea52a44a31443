//! Dashboard service: cached read models for the overview screens
//!
//! Every aggregate here is served through a `FetchCache` keyed by business
//! id, so a screenful of widgets mounting at once costs one query per
//! aggregate, refreshes are throttled, and a flaky database degrades to the
//! last known values instead of an error wall.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::cache::{CachePolicy, FetchCache};
use crate::error::AppResult;
use crate::services::ingredients::IngredientService;
use shared::models::LowStockItem;

/// The cache instances backing the dashboard read models.
/// Owned by `AppState`; constructed once per process (or per test).
pub struct DashboardCaches {
    pub summary: FetchCache<DashboardSummary>,
    pub revenue: FetchCache<Vec<RevenuePoint>>,
    pub top_dishes: FetchCache<Vec<TopDishEntry>>,
    pub low_stock: FetchCache<Vec<LowStockItem>>,
}

impl DashboardCaches {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            summary: FetchCache::new(policy),
            revenue: FetchCache::new(policy),
            top_dishes: FetchCache::new(policy),
            low_stock: FetchCache::new(policy),
        }
    }

    pub fn summary_key(business_id: Uuid) -> String {
        format!("dashboard-summary-{}", business_id)
    }

    pub fn low_stock_key(business_id: Uuid) -> String {
        format!("low-stock-{}", business_id)
    }

    /// Drop the per-business entries a recorded sale stales.
    /// The parameterized series keys age out through their TTL instead.
    pub async fn invalidate_after_sale(&self, business_id: Uuid) {
        self.summary
            .invalidate(&Self::summary_key(business_id))
            .await;
        self.low_stock
            .invalidate(&Self::low_stock_key(business_id))
            .await;
    }
}

/// Headline numbers for the overview screen
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub sales_today: i64,
    pub revenue_today: Decimal,
    pub active_dishes: i64,
    pub low_stock_count: i64,
}

/// One day of the revenue chart
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub sale_count: i64,
}

/// One row of the best-sellers table
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopDishEntry {
    pub dish_id: Uuid,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
    caches: Arc<DashboardCaches>,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool, caches: Arc<DashboardCaches>) -> Self {
        Self { db, caches }
    }

    /// Headline numbers, cached per business
    pub async fn summary(&self, business_id: Uuid) -> DashboardSummary {
        let key = DashboardCaches::summary_key(business_id);
        self.caches
            .summary
            .get_or_fetch(&key, || self.fetch_summary(business_id))
            .await
    }

    /// Daily revenue for the last `days` days, cached per business
    pub async fn revenue_series(&self, business_id: Uuid, days: i32) -> Vec<RevenuePoint> {
        let key = format!("dashboard-revenue-{}-{}", business_id, days);
        self.caches
            .revenue
            .get_or_fetch(&key, || self.fetch_revenue_series(business_id, days))
            .await
    }

    /// Best-selling dishes over the last 30 days, cached per business
    pub async fn top_dishes(&self, business_id: Uuid, limit: i64) -> Vec<TopDishEntry> {
        let key = format!("dashboard-top-dishes-{}-{}", business_id, limit);
        self.caches
            .top_dishes
            .get_or_fetch(&key, || self.fetch_top_dishes(business_id, limit))
            .await
    }

    /// The current low-stock set, cached per business.
    /// The sale submission flow queries this uncached on purpose.
    pub async fn low_stock(&self, business_id: Uuid) -> Vec<LowStockItem> {
        let key = DashboardCaches::low_stock_key(business_id);
        let ingredients = IngredientService::new(self.db.clone());
        self.caches
            .low_stock
            .get_or_fetch(&key, || async move {
                ingredients.list_low_stock(business_id).await
            })
            .await
    }

    async fn fetch_summary(&self, business_id: Uuid) -> AppResult<DashboardSummary> {
        let (sales_today, revenue_today) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM sales
            WHERE business_id = $1 AND date = CURRENT_DATE
            "#,
        )
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        let active_dishes = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM dishes WHERE business_id = $1 AND is_active",
        )
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        let low_stock_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ingredients WHERE business_id = $1 AND quantity < reorder_level",
        )
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardSummary {
            sales_today,
            revenue_today,
            active_dishes,
            low_stock_count,
        })
    }

    async fn fetch_revenue_series(
        &self,
        business_id: Uuid,
        days: i32,
    ) -> AppResult<Vec<RevenuePoint>> {
        let points = sqlx::query_as::<_, RevenuePoint>(
            r#"
            SELECT date, COALESCE(SUM(total_amount), 0) AS revenue, COUNT(*) AS sale_count
            FROM sales
            WHERE business_id = $1 AND date > CURRENT_DATE - $2
            GROUP BY date
            ORDER BY date
            "#,
        )
        .bind(business_id)
        .bind(days)
        .fetch_all(&self.db)
        .await?;

        Ok(points)
    }

    async fn fetch_top_dishes(
        &self,
        business_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<TopDishEntry>> {
        let entries = sqlx::query_as::<_, TopDishEntry>(
            r#"
            SELECT d.id AS dish_id, d.name,
                   COALESCE(SUM(s.quantity), 0)::bigint AS quantity_sold,
                   COALESCE(SUM(s.total_amount), 0) AS revenue
            FROM dishes d
            JOIN sales s ON s.dish_id = d.id
            WHERE d.business_id = $1 AND s.date > CURRENT_DATE - 30
            GROUP BY d.id, d.name
            ORDER BY quantity_sold DESC
            LIMIT $2
            "#,
        )
        .bind(business_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }
}
