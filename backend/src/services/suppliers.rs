//! Supplier management service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::Supplier;

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating a supplier; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    id: Uuid,
    business_id: Uuid,
    name: String,
    contact_name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SupplierRow {
    fn into_supplier(self) -> Supplier {
        Supplier {
            id: self.id,
            business_id: self.business_id,
            name: self.name,
            contact_name: self.contact_name,
            phone: self.phone,
            email: self.email,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SUPPLIER_COLUMNS: &str =
    "id, business_id, name, contact_name, phone, email, notes, created_at, updated_at";

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a supplier
    pub async fn create(&self, business_id: Uuid, input: CreateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            INSERT INTO suppliers (business_id, name, contact_name, phone, email, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(business_id)
        .bind(&input.name)
        .bind(&input.contact_name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_supplier())
    }

    /// List suppliers for a business
    pub async fn list(&self, business_id: Uuid) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE business_id = $1 ORDER BY name",
            SUPPLIER_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SupplierRow::into_supplier).collect())
    }

    /// Get a supplier by id
    pub async fn get(&self, business_id: Uuid, supplier_id: Uuid) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1 AND business_id = $2",
            SUPPLIER_COLUMNS
        ))
        .bind(supplier_id)
        .bind(business_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(row.into_supplier())
    }

    /// Update a supplier
    pub async fn update(
        &self,
        business_id: Uuid,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<Supplier> {
        input.validate()?;

        let current = self.get(business_id, supplier_id).await?;

        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            UPDATE suppliers
            SET name = $1, contact_name = $2, phone = $3, email = $4, notes = $5,
                updated_at = NOW()
            WHERE id = $6 AND business_id = $7
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(input.name.unwrap_or(current.name))
        .bind(input.contact_name.or(current.contact_name))
        .bind(input.phone.or(current.phone))
        .bind(input.email.or(current.email))
        .bind(input.notes.or(current.notes))
        .bind(supplier_id)
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_supplier())
    }

    /// Delete a supplier
    pub async fn delete(&self, business_id: Uuid, supplier_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1 AND business_id = $2")
            .bind(supplier_id)
            .bind(business_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }
}
