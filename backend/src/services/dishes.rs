//! Dish and recipe service
//!
//! Dishes carry their bill of ingredients through the `dish_ingredients`
//! join table. Rows come back flat and are grouped in memory into the
//! nested shapes the screens consume.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::{Dish, DishIngredient, Recipe};
use shared::validation::validate_price;

/// Dish service
#[derive(Clone)]
pub struct DishService {
    db: PgPool,
}

/// One recipe line of a create/update request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLineInput {
    #[serde(alias = "inventory_item_id", alias = "inventoryItemId")]
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
}

/// Input for creating a dish
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDishInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(alias = "selling_price", alias = "sellingPrice")]
    pub price: Decimal,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<RecipeLineInput>,
}

/// Input for updating a dish; a present `ingredients` list replaces the recipe
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDishInput {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[serde(alias = "selling_price", alias = "sellingPrice")]
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub ingredients: Option<Vec<RecipeLineInput>>,
}

#[derive(Debug, FromRow)]
struct DishRow {
    id: Uuid,
    business_id: Uuid,
    name: String,
    price: Decimal,
    category: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DishRow {
    fn into_dish(self, ingredients: Vec<DishIngredient>) -> Dish {
        Dish {
            id: self.id,
            business_id: self.business_id,
            name: self.name,
            price: self.price,
            category: self.category,
            description: self.description,
            image_url: self.image_url,
            is_active: self.is_active,
            ingredients,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Flat recipe line as joined with the ingredient record
#[derive(Debug, FromRow)]
struct RecipeLineRow {
    dish_id: Uuid,
    ingredient_id: Uuid,
    name: String,
    unit: String,
    quantity: Decimal,
}

const DISH_COLUMNS: &str = "id, business_id, name, price, category, description, image_url, \
     is_active, created_at, updated_at";

impl DishService {
    /// Create a new DishService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a dish with its recipe
    pub async fn create(&self, business_id: Uuid, input: CreateDishInput) -> AppResult<Dish> {
        input.validate()?;
        validate_price(input.price).map_err(|msg| AppError::Validation {
            field: "price".to_string(),
            message: msg.to_string(),
        })?;
        self.validate_lines(business_id, &input.ingredients).await?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, DishRow>(&format!(
            r#"
            INSERT INTO dishes (business_id, name, price, category, description, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            DISH_COLUMNS
        ))
        .bind(business_id)
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.category)
        .bind(&input.description)
        .bind(&input.image_url)
        .fetch_one(&mut *tx)
        .await?;

        for line in &input.ingredients {
            sqlx::query(
                r#"
                INSERT INTO dish_ingredients (dish_id, ingredient_id, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(row.id)
            .bind(line.ingredient_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(business_id, row.id).await
    }

    /// List dishes with their recipes
    pub async fn list(&self, business_id: Uuid) -> AppResult<Vec<Dish>> {
        let rows = sqlx::query_as::<_, DishRow>(&format!(
            "SELECT {} FROM dishes WHERE business_id = $1 ORDER BY name",
            DISH_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        let dish_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut lines = self.lines_for(&dish_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let ingredients = lines.remove(&row.id).unwrap_or_default();
                row.into_dish(ingredients)
            })
            .collect())
    }

    /// Get a dish with its recipe
    pub async fn get(&self, business_id: Uuid, dish_id: Uuid) -> AppResult<Dish> {
        let row = sqlx::query_as::<_, DishRow>(&format!(
            "SELECT {} FROM dishes WHERE id = $1 AND business_id = $2",
            DISH_COLUMNS
        ))
        .bind(dish_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Dish".to_string()))?;

        let mut lines = self.lines_for(&[row.id]).await?;
        let ingredients = lines.remove(&row.id).unwrap_or_default();
        Ok(row.into_dish(ingredients))
    }

    /// Update a dish; a present ingredient list replaces the whole recipe
    pub async fn update(
        &self,
        business_id: Uuid,
        dish_id: Uuid,
        input: UpdateDishInput,
    ) -> AppResult<Dish> {
        input.validate()?;

        let current = self.get(business_id, dish_id).await?;

        let price = input.price.unwrap_or(current.price);
        validate_price(price).map_err(|msg| AppError::Validation {
            field: "price".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(lines) = &input.ingredients {
            self.validate_lines(business_id, lines).await?;
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE dishes
            SET name = $1, price = $2, category = $3, description = $4,
                image_url = $5, is_active = $6, updated_at = NOW()
            WHERE id = $7 AND business_id = $8
            "#,
        )
        .bind(input.name.unwrap_or(current.name))
        .bind(price)
        .bind(input.category.or(current.category))
        .bind(input.description.or(current.description))
        .bind(input.image_url.or(current.image_url))
        .bind(input.is_active.unwrap_or(current.is_active))
        .bind(dish_id)
        .bind(business_id)
        .execute(&mut *tx)
        .await?;

        if let Some(lines) = &input.ingredients {
            sqlx::query("DELETE FROM dish_ingredients WHERE dish_id = $1")
                .bind(dish_id)
                .execute(&mut *tx)
                .await?;

            for line in lines {
                sqlx::query(
                    r#"
                    INSERT INTO dish_ingredients (dish_id, ingredient_id, quantity)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(dish_id)
                .bind(line.ingredient_id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get(business_id, dish_id).await
    }

    /// Delete a dish and its recipe lines
    pub async fn delete(&self, business_id: Uuid, dish_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = $1 AND business_id = $2")
            .bind(dish_id)
            .bind(business_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Dish".to_string()));
        }

        Ok(())
    }

    /// The flat recipe feed consumed by the entry screens
    pub async fn recipes(&self, business_id: Uuid) -> AppResult<Vec<Recipe>> {
        let dishes = self.list(business_id).await?;
        Ok(dishes
            .into_iter()
            .filter(|d| d.is_active)
            .map(|d| Recipe {
                id: d.id,
                name: d.name,
                price: d.price,
                category: d.category,
                description: d.description,
                image: d.image_url,
                ingredients: d.ingredients,
            })
            .collect())
    }

    /// Recipe lines for a set of dishes, keyed by dish id.
    /// Used by the sale submission flow to compute inventory impact.
    pub async fn recipe_map(
        &self,
        business_id: Uuid,
        dish_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<DishIngredient>>> {
        let owned = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM dishes WHERE business_id = $1 AND id = ANY($2)",
        )
        .bind(business_id)
        .bind(dish_ids)
        .fetch_all(&self.db)
        .await?;

        self.lines_for(&owned).await
    }

    /// Per-dish prices for a set of dishes
    pub async fn price_map(
        &self,
        business_id: Uuid,
        dish_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Decimal>> {
        let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT id, price FROM dishes WHERE business_id = $1 AND id = ANY($2)",
        )
        .bind(business_id)
        .bind(dish_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn lines_for(
        &self,
        dish_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<DishIngredient>>> {
        if dish_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RecipeLineRow>(
            r#"
            SELECT di.dish_id, di.ingredient_id, i.name, i.unit, di.quantity
            FROM dish_ingredients di
            JOIN ingredients i ON i.id = di.ingredient_id
            WHERE di.dish_id = ANY($1)
            ORDER BY i.name
            "#,
        )
        .bind(dish_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<DishIngredient>> = HashMap::new();
        for row in rows {
            grouped.entry(row.dish_id).or_default().push(DishIngredient {
                ingredient_id: row.ingredient_id,
                name: row.name,
                unit: row.unit,
                quantity: row.quantity,
            });
        }
        Ok(grouped)
    }

    async fn validate_lines(
        &self,
        business_id: Uuid,
        lines: &[RecipeLineInput],
    ) -> AppResult<()> {
        for line in lines {
            if line.quantity <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "ingredients".to_string(),
                    message: "Recipe quantities must be positive".to_string(),
                });
            }
        }

        if lines.is_empty() {
            return Ok(());
        }

        let mut ids: Vec<Uuid> = lines.iter().map(|l| l.ingredient_id).collect();
        ids.sort();
        ids.dedup();
        if ids.len() < lines.len() {
            return Err(AppError::Validation {
                field: "ingredients".to_string(),
                message: "Recipe lists an ingredient twice".to_string(),
            });
        }

        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ingredients WHERE business_id = $1 AND id = ANY($2)",
        )
        .bind(business_id)
        .bind(&ids)
        .fetch_one(&self.db)
        .await?;

        if (owned as usize) < ids.len() {
            return Err(AppError::NotFound("Ingredient".to_string()));
        }

        Ok(())
    }
}
