//! Shopping list service
//!
//! Lists are generated from the coarse low-stock set after a sale batch, or
//! on demand from the shopping screen. Generation is best-effort: callers
//! in the sale flow log a failure and move on.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::impact::restock_quantity;
use shared::models::{LowStockItem, ShoppingList, ShoppingListItem};

/// Shopping list service
#[derive(Clone)]
pub struct ShoppingListService {
    db: PgPool,
}

/// Input for toggling an item's purchased flag
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPurchasedInput {
    pub purchased: bool,
}

#[derive(Debug, FromRow)]
struct ListRow {
    id: Uuid,
    business_id: Uuid,
    generated_from: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    shopping_list_id: Uuid,
    ingredient_id: Uuid,
    name: String,
    unit: String,
    quantity_needed: Decimal,
    purchased: bool,
}

impl ItemRow {
    fn into_item(self) -> ShoppingListItem {
        ShoppingListItem {
            id: self.id,
            ingredient_id: self.ingredient_id,
            name: self.name,
            unit: self.unit,
            quantity_needed: self.quantity_needed,
            purchased: self.purchased,
        }
    }
}

const ITEM_COLUMNS: &str =
    "id, shopping_list_id, ingredient_id, name, unit, quantity_needed, purchased";

impl ShoppingListService {
    /// Create a new ShoppingListService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Generate a shopping list from a low-stock snapshot.
    /// Each item's needed quantity tops the ingredient back up to its
    /// reorder level.
    pub async fn generate_from_low_stock(
        &self,
        business_id: Uuid,
        items: &[LowStockItem],
    ) -> AppResult<ShoppingList> {
        if items.is_empty() {
            return Err(AppError::ValidationError(
                "Nothing to generate: no low-stock items".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let list = sqlx::query_as::<_, ListRow>(
            r#"
            INSERT INTO shopping_lists (business_id, generated_from)
            VALUES ($1, 'low_stock')
            RETURNING id, business_id, generated_from, created_at
            "#,
        )
        .bind(business_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut list_items = Vec::with_capacity(items.len());
        for item in items {
            let needed = restock_quantity(item.quantity, item.reorder_level);
            let row = sqlx::query_as::<_, ItemRow>(&format!(
                r#"
                INSERT INTO shopping_list_items (
                    shopping_list_id, ingredient_id, name, unit, quantity_needed
                )
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {}
                "#,
                ITEM_COLUMNS
            ))
            .bind(list.id)
            .bind(item.ingredient_id)
            .bind(&item.name)
            .bind(&item.unit)
            .bind(needed)
            .fetch_one(&mut *tx)
            .await?;
            list_items.push(row.into_item());
        }

        tx.commit().await?;

        Ok(ShoppingList {
            id: list.id,
            business_id: list.business_id,
            generated_from: list.generated_from,
            items: list_items,
            created_at: list.created_at,
        })
    }

    /// List shopping lists, newest first
    pub async fn list(&self, business_id: Uuid) -> AppResult<Vec<ShoppingList>> {
        let lists = sqlx::query_as::<_, ListRow>(
            r#"
            SELECT id, business_id, generated_from, created_at
            FROM shopping_lists
            WHERE business_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        let list_ids: Vec<Uuid> = lists.iter().map(|l| l.id).collect();
        let mut items = self.items_for(&list_ids).await?;

        Ok(lists
            .into_iter()
            .map(|list| ShoppingList {
                items: items.remove(&list.id).unwrap_or_default(),
                id: list.id,
                business_id: list.business_id,
                generated_from: list.generated_from,
                created_at: list.created_at,
            })
            .collect())
    }

    /// Get one shopping list with its items
    pub async fn get(&self, business_id: Uuid, list_id: Uuid) -> AppResult<ShoppingList> {
        let list = sqlx::query_as::<_, ListRow>(
            r#"
            SELECT id, business_id, generated_from, created_at
            FROM shopping_lists
            WHERE id = $1 AND business_id = $2
            "#,
        )
        .bind(list_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shopping list".to_string()))?;

        let mut items = self.items_for(&[list.id]).await?;

        Ok(ShoppingList {
            items: items.remove(&list.id).unwrap_or_default(),
            id: list.id,
            business_id: list.business_id,
            generated_from: list.generated_from,
            created_at: list.created_at,
        })
    }

    /// Delete a shopping list and its items
    pub async fn delete(&self, business_id: Uuid, list_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM shopping_lists WHERE id = $1 AND business_id = $2")
            .bind(list_id)
            .bind(business_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Shopping list".to_string()));
        }

        Ok(())
    }

    /// Mark an item as purchased (or not)
    pub async fn set_purchased(
        &self,
        business_id: Uuid,
        list_id: Uuid,
        item_id: Uuid,
        purchased: bool,
    ) -> AppResult<ShoppingListItem> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE shopping_list_items AS sli
            SET purchased = $1
            FROM shopping_lists sl
            WHERE sli.id = $2
              AND sli.shopping_list_id = $3
              AND sl.id = sli.shopping_list_id
              AND sl.business_id = $4
            RETURNING sli.id, sli.shopping_list_id, sli.ingredient_id, sli.name, sli.unit,
                      sli.quantity_needed, sli.purchased
            "#,
        )
        .bind(purchased)
        .bind(item_id)
        .bind(list_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shopping list item".to_string()))?;

        Ok(row.into_item())
    }

    async fn items_for(
        &self,
        list_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<ShoppingListItem>>> {
        if list_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            SELECT {}
            FROM shopping_list_items
            WHERE shopping_list_id = ANY($1)
            ORDER BY name
            "#,
            ITEM_COLUMNS
        ))
        .bind(list_ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<ShoppingListItem>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.shopping_list_id)
                .or_default()
                .push(row.into_item());
        }
        Ok(grouped)
    }
}
