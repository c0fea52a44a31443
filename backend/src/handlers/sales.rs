//! HTTP handlers for sales endpoints

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{SaleEntry, SaleLine};
use crate::services::sales::{
    SaleService, SubmitSalesInput, SubmitSalesOutcome, UpdateSaleInput,
};
use crate::AppState;
use shared::impact::IngredientShortage;
use shared::types::DateRange;

/// Optional date-range filter for list and export endpoints
#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SalesQuery {
    fn into_range(self) -> Option<DateRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        }
    }
}

/// Submit a batch of sales for one date
pub async fn submit_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SubmitSalesInput>,
) -> AppResult<Json<SubmitSalesOutcome>> {
    let business_id = current_user.0.business_id;
    let service = SaleService::new(state.db.clone());
    let outcome = service
        .submit(business_id, current_user.0.user_id, input)
        .await?;

    // A recorded batch stales the cached dashboard read models
    state.caches.invalidate_after_sale(business_id).await;

    Ok(Json(outcome))
}

/// Request body for the impact preview endpoint
#[derive(Debug, Deserialize)]
pub struct ImpactPreviewInput {
    pub entries: Vec<SaleLine>,
}

/// Preview the inventory impact of a hypothetical batch
pub async fn preview_impact(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ImpactPreviewInput>,
) -> AppResult<Json<Vec<IngredientShortage>>> {
    let service = SaleService::new(state.db);
    let shortages = service
        .impact_preview(current_user.0.business_id, &input.entries)
        .await?;
    Ok(Json(shortages))
}

/// List sales, optionally restricted to a date range
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SalesQuery>,
) -> AppResult<Json<Vec<SaleEntry>>> {
    let service = SaleService::new(state.db);
    let sales = service
        .list(current_user.0.business_id, query.into_range())
        .await?;
    Ok(Json(sales))
}

/// Edit a recorded sale
pub async fn update_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<UpdateSaleInput>,
) -> AppResult<Json<SaleEntry>> {
    let service = SaleService::new(state.db);
    let sale = service
        .update(current_user.0.business_id, sale_id, input)
        .await?;
    Ok(Json(sale))
}

/// Delete a recorded sale
pub async fn delete_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = SaleService::new(state.db);
    service.delete(current_user.0.business_id, sale_id).await?;
    Ok(Json(()))
}

/// Export sales as CSV
pub async fn export_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SalesQuery>,
) -> AppResult<impl IntoResponse> {
    let service = SaleService::new(state.db);
    let csv = service
        .export_csv(current_user.0.business_id, query.into_range())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sales.csv\"",
            ),
        ],
        csv,
    ))
}
