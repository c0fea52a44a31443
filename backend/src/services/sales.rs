//! Sales service: batch submission orchestration, history, and export
//!
//! Submission runs `validating -> submitting -> success | failure`.
//! Validation happens before any write. Each entry is inserted and its
//! stock decrement applied sequentially; a decrement failure is logged and
//! never rolls back the sale or stops later entries. After the batch, the
//! coarse low-stock set is re-queried (best effort, racy by design) to
//! drive the warning and shopping list generation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::dishes::DishService;
use crate::services::ingredients::IngredientService;
use crate::services::shopping_list::ShoppingListService;
use shared::impact::{
    assess_shortages, calculate_inventory_impact, low_stock_warning, IngredientShortage,
};
use shared::models::{LowStockItem, SaleEntry, SaleLine, StockDelta};
use shared::types::DateRange;
use shared::validation::validate_sale_date;

/// Sales service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Input for submitting a batch of sales for one date
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSalesInput {
    /// Sale date in `YYYY-MM-DD`
    pub date: String,
    pub entries: Vec<SaleLine>,
}

/// Outcome of a batch submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSalesOutcome {
    pub recorded: usize,
    pub total_amount: Decimal,
    pub sales: Vec<SaleEntry>,
    /// Present when the post-submit low-stock check found anything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_warning: Option<String>,
    pub low_stock: Vec<LowStockItem>,
}

/// Input for editing a recorded sale
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleInput {
    pub quantity: Option<i32>,
    /// Sale date in `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    business_id: Uuid,
    user_id: Option<Uuid>,
    dish_id: Uuid,
    quantity: i32,
    total_amount: Decimal,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self) -> SaleEntry {
        SaleEntry {
            id: self.id,
            business_id: self.business_id,
            user_id: self.user_id,
            dish_id: self.dish_id,
            quantity: self.quantity,
            total_amount: self.total_amount,
            date: self.date,
            created_at: self.created_at,
        }
    }
}

const SALE_COLUMNS: &str =
    "id, business_id, user_id, dish_id, quantity, total_amount, date, created_at";

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Submit a batch of sales for one date.
    ///
    /// Validation rejects the batch before any write; after that, failures
    /// of the per-entry stock decrement and of the post-submit low-stock
    /// check degrade rather than fail the submission.
    pub async fn submit(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        input: SubmitSalesInput,
    ) -> AppResult<SubmitSalesOutcome> {
        // -- validating ------------------------------------------------------
        let date = validate_sale_date(&input.date).map_err(|_| AppError::Validation {
            field: "date".to_string(),
            message: format!("Invalid sale date: {}", input.date),
        })?;

        let lines: Vec<SaleLine> = input
            .entries
            .iter()
            .filter(|line| line.quantity > 0)
            .copied()
            .collect();

        if lines.is_empty() {
            return Err(AppError::Validation {
                field: "entries".to_string(),
                message: "No items to submit".to_string(),
            });
        }

        // -- submitting ------------------------------------------------------
        let dishes = DishService::new(self.db.clone());
        let ingredients = IngredientService::new(self.db.clone());

        let dish_ids: Vec<Uuid> = lines.iter().map(|line| line.dish_id).collect();
        let prices = dishes.price_map(business_id, &dish_ids).await?;
        let recipes = dishes.recipe_map(business_id, &dish_ids).await?;

        let mut sales = Vec::with_capacity(lines.len());
        let mut total_amount = Decimal::ZERO;

        for line in &lines {
            let price = match prices.get(&line.dish_id) {
                Some(price) => *price,
                None => return Err(AppError::NotFound("Dish".to_string())),
            };
            let line_total = price * Decimal::from(line.quantity);

            let row = sqlx::query_as::<_, SaleRow>(&format!(
                r#"
                INSERT INTO sales (business_id, user_id, dish_id, quantity, total_amount, date)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {}
                "#,
                SALE_COLUMNS
            ))
            .bind(business_id)
            .bind(user_id)
            .bind(line.dish_id)
            .bind(line.quantity)
            .bind(line_total)
            .bind(date)
            .fetch_one(&self.db)
            .await?;

            total_amount += line_total;
            sales.push(row.into_sale());

            // Stock decrement for this entry. Not transactional with the
            // sale insert: a failure is logged and the sale stands.
            let deltas = self.entry_deltas(line, &recipes);
            if let Err(err) = ingredients.apply_stock_deltas(business_id, &deltas).await {
                tracing::warn!(
                    dish_id = %line.dish_id,
                    error = %err,
                    "stock decrement failed after sale insert"
                );
            }
        }

        // -- success: post-submit low-stock check ---------------------------
        let (low_stock, low_stock_warning) = match ingredients.list_low_stock(business_id).await {
            Ok(items) if !items.is_empty() => {
                let shopping_lists = ShoppingListService::new(self.db.clone());
                if let Err(err) = shopping_lists
                    .generate_from_low_stock(business_id, &items)
                    .await
                {
                    tracing::warn!(error = %err, "shopping list generation failed");
                }
                let warning = low_stock_warning(&items);
                (items, Some(warning))
            }
            Ok(_) => (Vec::new(), None),
            Err(err) => {
                tracing::warn!(error = %err, "post-submit low-stock check failed");
                (Vec::new(), None)
            }
        };

        Ok(SubmitSalesOutcome {
            recorded: sales.len(),
            total_amount,
            sales,
            low_stock_warning,
            low_stock,
        })
    }

    /// Preview the inventory impact of a hypothetical batch without writing
    pub async fn impact_preview(
        &self,
        business_id: Uuid,
        entries: &[SaleLine],
    ) -> AppResult<Vec<IngredientShortage>> {
        let dishes = DishService::new(self.db.clone());
        let ingredients = IngredientService::new(self.db.clone());

        let sold = entries
            .iter()
            .map(|line| (line.dish_id, line.quantity))
            .collect();
        let dish_ids: Vec<Uuid> = entries.iter().map(|line| line.dish_id).collect();
        let recipes = dishes.recipe_map(business_id, &dish_ids).await?;

        let impact = calculate_inventory_impact(&sold, &recipes);
        let ingredient_ids: Vec<Uuid> = impact.keys().copied().collect();
        let levels = ingredients.stock_levels(business_id, &ingredient_ids).await?;

        Ok(assess_shortages(&impact, &levels))
    }

    /// List sales, optionally restricted to a date range
    pub async fn list(
        &self,
        business_id: Uuid,
        range: Option<DateRange>,
    ) -> AppResult<Vec<SaleEntry>> {
        let rows = match range {
            Some(range) => {
                sqlx::query_as::<_, SaleRow>(&format!(
                    r#"
                    SELECT {}
                    FROM sales
                    WHERE business_id = $1 AND date >= $2 AND date <= $3
                    ORDER BY date DESC, created_at DESC
                    "#,
                    SALE_COLUMNS
                ))
                .bind(business_id)
                .bind(range.start)
                .bind(range.end)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, SaleRow>(&format!(
                    r#"
                    SELECT {}
                    FROM sales
                    WHERE business_id = $1
                    ORDER BY date DESC, created_at DESC
                    "#,
                    SALE_COLUMNS
                ))
                .bind(business_id)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(SaleRow::into_sale).collect())
    }

    /// Edit a recorded sale; the total is recomputed from the dish price
    /// when the quantity changes
    pub async fn update(
        &self,
        business_id: Uuid,
        sale_id: Uuid,
        input: UpdateSaleInput,
    ) -> AppResult<SaleEntry> {
        let current = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM sales WHERE id = $1 AND business_id = $2",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let quantity = match input.quantity {
            Some(quantity) if quantity > 0 => quantity,
            Some(_) => {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Quantity must be positive".to_string(),
                })
            }
            None => current.quantity,
        };

        let date = match &input.date {
            Some(raw) => validate_sale_date(raw).map_err(|_| AppError::Validation {
                field: "date".to_string(),
                message: format!("Invalid sale date: {}", raw),
            })?,
            None => current.date,
        };

        let total_amount = if quantity != current.quantity {
            let dishes = DishService::new(self.db.clone());
            let prices = dishes.price_map(business_id, &[current.dish_id]).await?;
            match prices.get(&current.dish_id) {
                Some(price) => *price * Decimal::from(quantity),
                // Dish has been deleted since: scale the stored total instead
                None => {
                    current.total_amount / Decimal::from(current.quantity.max(1))
                        * Decimal::from(quantity)
                }
            }
        } else {
            current.total_amount
        };

        let row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            UPDATE sales
            SET quantity = $1, total_amount = $2, date = $3
            WHERE id = $4 AND business_id = $5
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(quantity)
        .bind(total_amount)
        .bind(date)
        .bind(sale_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_sale())
    }

    /// Delete a recorded sale
    pub async fn delete(&self, business_id: Uuid, sale_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1 AND business_id = $2")
            .bind(sale_id)
            .bind(business_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Sale".to_string()));
        }

        Ok(())
    }

    /// Export sales as CSV, optionally restricted to a date range
    pub async fn export_csv(
        &self,
        business_id: Uuid,
        range: Option<DateRange>,
    ) -> AppResult<String> {
        let sales = self.list(business_id, range).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        for sale in &sales {
            writer
                .serialize(sale)
                .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;

        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding: {}", e)))
    }

    /// Per-ingredient deltas for one sold entry (negative: consumption)
    fn entry_deltas(
        &self,
        line: &SaleLine,
        recipes: &std::collections::HashMap<Uuid, Vec<shared::models::DishIngredient>>,
    ) -> Vec<StockDelta> {
        let mut sold = std::collections::HashMap::new();
        sold.insert(line.dish_id, line.quantity);

        calculate_inventory_impact(&sold, recipes)
            .into_values()
            .map(|item| StockDelta {
                ingredient_id: item.ingredient_id,
                delta: -item.quantity_used,
            })
            .collect()
    }
}
