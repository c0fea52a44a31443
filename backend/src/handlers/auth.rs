//! HTTP handlers for authentication and profile endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{BusinessProfile, RegisterBusinessInput, User};
use crate::services::auth::{AuthResponse, AuthService, LoginInput, UpdateBusinessInput};
use crate::AppState;

/// Register a new business with its owner account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterBusinessInput>,
) -> AppResult<Json<AuthResponse>> {
    let service = AuthService::new(state.db, &state.config);
    let response = service.register(input).await?;
    Ok(Json(response))
}

/// Authenticate with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthResponse>> {
    let service = AuthService::new(state.db, &state.config);
    let response = service.login(input).await?;
    Ok(Json(response))
}

/// Response for the current-user endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub business: BusinessProfile,
}

/// Get the current user and their business profile
pub async fn get_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<MeResponse>> {
    let service = AuthService::new(state.db, &state.config);
    let (user, business) = service.me(current_user.0.user_id).await?;
    Ok(Json(MeResponse { user, business }))
}

/// Get the business profile
pub async fn get_business_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<BusinessProfile>> {
    let service = AuthService::new(state.db, &state.config);
    let business = service.get_business(current_user.0.business_id).await?;
    Ok(Json(business))
}

/// Update the business profile
pub async fn update_business_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateBusinessInput>,
) -> AppResult<Json<BusinessProfile>> {
    let service = AuthService::new(state.db, &state.config);
    let business = service
        .update_business(current_user.0.business_id, input)
        .await?;
    Ok(Json(business))
}
