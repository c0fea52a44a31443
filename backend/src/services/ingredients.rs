//! Ingredient inventory service
//!
//! Stock reads and mutations. The batched `apply_stock_deltas` is the single
//! entry point sales use to decrement stock, so a whole dish's consumption
//! lands in one statement.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::impact::StockLevel;
use shared::models::{Ingredient, LowStockItem, StockDelta};
use shared::validation::{validate_stock_quantity, validate_unit};

/// Ingredient service
#[derive(Clone)]
pub struct IngredientService {
    db: PgPool,
}

/// Input for creating an ingredient
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub unit: String,
    pub supplier_id: Option<Uuid>,
    pub quantity: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
    pub minimum_stock_level: Option<Decimal>,
}

/// Input for updating an ingredient; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIngredientInput {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub unit: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub quantity: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub reorder_level: Option<Decimal>,
    pub minimum_stock_level: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct IngredientRow {
    id: Uuid,
    business_id: Uuid,
    supplier_id: Option<Uuid>,
    name: String,
    unit: String,
    quantity: Decimal,
    cost: Decimal,
    reorder_level: Decimal,
    minimum_stock_level: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IngredientRow {
    fn into_ingredient(self) -> Ingredient {
        Ingredient {
            id: self.id,
            business_id: self.business_id,
            supplier_id: self.supplier_id,
            name: self.name,
            unit: self.unit,
            quantity: self.quantity,
            cost: self.cost,
            reorder_level: self.reorder_level,
            minimum_stock_level: self.minimum_stock_level,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct StockLevelRow {
    id: Uuid,
    quantity: Decimal,
    minimum_stock_level: Decimal,
}

const INGREDIENT_COLUMNS: &str = "id, business_id, supplier_id, name, unit, quantity, cost, \
     reorder_level, minimum_stock_level, created_at, updated_at";

impl IngredientService {
    /// Create a new IngredientService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an ingredient
    pub async fn create(
        &self,
        business_id: Uuid,
        input: CreateIngredientInput,
    ) -> AppResult<Ingredient> {
        input.validate()?;
        validate_unit(&input.unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
        })?;

        let quantity = input.quantity.unwrap_or(Decimal::ZERO);
        validate_stock_quantity(quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(supplier_id) = input.supplier_id {
            self.ensure_supplier(business_id, supplier_id).await?;
        }

        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            r#"
            INSERT INTO ingredients (
                business_id, supplier_id, name, unit, quantity, cost,
                reorder_level, minimum_stock_level
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            INGREDIENT_COLUMNS
        ))
        .bind(business_id)
        .bind(input.supplier_id)
        .bind(&input.name)
        .bind(&input.unit)
        .bind(quantity)
        .bind(input.cost.unwrap_or(Decimal::ZERO))
        .bind(input.reorder_level.unwrap_or(Decimal::ZERO))
        .bind(input.minimum_stock_level.unwrap_or(Decimal::ZERO))
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_ingredient())
    }

    /// List ingredients for a business
    pub async fn list(&self, business_id: Uuid) -> AppResult<Vec<Ingredient>> {
        let rows = sqlx::query_as::<_, IngredientRow>(&format!(
            "SELECT {} FROM ingredients WHERE business_id = $1 ORDER BY name",
            INGREDIENT_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(IngredientRow::into_ingredient).collect())
    }

    /// Get an ingredient by id
    pub async fn get(&self, business_id: Uuid, ingredient_id: Uuid) -> AppResult<Ingredient> {
        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            "SELECT {} FROM ingredients WHERE id = $1 AND business_id = $2",
            INGREDIENT_COLUMNS
        ))
        .bind(ingredient_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        Ok(row.into_ingredient())
    }

    /// Update an ingredient
    pub async fn update(
        &self,
        business_id: Uuid,
        ingredient_id: Uuid,
        input: UpdateIngredientInput,
    ) -> AppResult<Ingredient> {
        input.validate()?;

        let current = self.get(business_id, ingredient_id).await?;

        let unit = input.unit.unwrap_or(current.unit);
        validate_unit(&unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
        })?;
        let quantity = input.quantity.unwrap_or(current.quantity);
        validate_stock_quantity(quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(supplier_id) = input.supplier_id {
            self.ensure_supplier(business_id, supplier_id).await?;
        }

        let row = sqlx::query_as::<_, IngredientRow>(&format!(
            r#"
            UPDATE ingredients
            SET name = $1, unit = $2, supplier_id = $3, quantity = $4, cost = $5,
                reorder_level = $6, minimum_stock_level = $7, updated_at = NOW()
            WHERE id = $8 AND business_id = $9
            RETURNING {}
            "#,
            INGREDIENT_COLUMNS
        ))
        .bind(input.name.unwrap_or(current.name))
        .bind(&unit)
        .bind(input.supplier_id.or(current.supplier_id))
        .bind(quantity)
        .bind(input.cost.unwrap_or(current.cost))
        .bind(input.reorder_level.unwrap_or(current.reorder_level))
        .bind(input.minimum_stock_level.unwrap_or(current.minimum_stock_level))
        .bind(ingredient_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_ingredient())
    }

    /// Delete an ingredient
    pub async fn delete(&self, business_id: Uuid, ingredient_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1 AND business_id = $2")
            .bind(ingredient_id)
            .bind(business_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Ingredient".to_string()));
        }

        Ok(())
    }

    /// The coarse low-stock query: everything under its reorder level.
    /// Deliberately not tied to any particular sale's impact.
    pub async fn list_low_stock(&self, business_id: Uuid) -> AppResult<Vec<LowStockItem>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT id, name, unit, quantity, reorder_level
            FROM ingredients
            WHERE business_id = $1 AND quantity < reorder_level
            ORDER BY name
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LowStockItem {
                ingredient_id: r.id,
                name: r.name,
                unit: r.unit,
                quantity: r.quantity,
                reorder_level: r.reorder_level,
            })
            .collect())
    }

    /// Stock levels for a set of ingredients, keyed by id.
    /// Ingredients missing from the result have no inventory record.
    pub async fn stock_levels(
        &self,
        business_id: Uuid,
        ingredient_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, StockLevel>> {
        if ingredient_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, StockLevelRow>(
            r#"
            SELECT id, quantity, minimum_stock_level
            FROM ingredients
            WHERE business_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(business_id)
        .bind(ingredient_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.id,
                    StockLevel {
                        current_stock: r.quantity,
                        minimum_stock: r.minimum_stock_level,
                    },
                )
            })
            .collect())
    }

    /// Apply a batch of signed stock deltas in one statement.
    /// Stock is floored at zero; the projection layer already treats
    /// anything at zero as depleted.
    pub async fn apply_stock_deltas(
        &self,
        business_id: Uuid,
        deltas: &[StockDelta],
    ) -> AppResult<()> {
        if deltas.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = deltas.iter().map(|d| d.ingredient_id).collect();
        let amounts: Vec<Decimal> = deltas.iter().map(|d| d.delta).collect();

        sqlx::query(
            r#"
            UPDATE ingredients AS i
            SET quantity = GREATEST(0, i.quantity + d.delta),
                updated_at = NOW()
            FROM (
                SELECT unnest($1::uuid[]) AS ingredient_id,
                       unnest($2::numeric[]) AS delta
            ) AS d
            WHERE i.id = d.ingredient_id AND i.business_id = $3
            "#,
        )
        .bind(&ids)
        .bind(&amounts)
        .bind(business_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn ensure_supplier(&self, business_id: Uuid, supplier_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1 AND business_id = $2)",
        )
        .bind(supplier_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct LowStockRow {
    id: Uuid,
    name: String,
    unit: String,
    quantity: Decimal,
    reorder_level: Decimal,
}
