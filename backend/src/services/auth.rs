//! Authentication service for registration, login, and identity
//!
//! Auth is boundary-only: it establishes who the caller is and which
//! business profile scopes their data. There is no role system.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::models::{BusinessProfile, BusinessType, RegisterBusinessInput, User};
use shared::validation::{validate_email, validate_name, validate_password};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Response after successful registration or login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
    pub business: BusinessProfile,
}

/// Login credentials
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Input for updating the business profile
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusinessInput {
    pub name: Option<String>,
    pub business_type: Option<BusinessType>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub business_id: String,
    pub exp: i64,
    pub iat: i64,
}

/// User row as stored
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    business_id: Uuid,
    email: String,
    password_hash: String,
    display_name: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            business_id: self.business_id,
            email: self.email,
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}

/// Business row as stored; `business_type` is TEXT on the wire
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BusinessRow {
    pub id: Uuid,
    pub name: String,
    pub business_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessRow {
    pub(crate) fn into_profile(self) -> BusinessProfile {
        BusinessProfile {
            id: self.id,
            name: self.name,
            // Unknown labels from older rows read as plain restaurants
            business_type: BusinessType::parse(&self.business_type)
                .unwrap_or(BusinessType::Restaurant),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SELECT_BUSINESS: &str =
    "SELECT id, name, business_type, created_at, updated_at FROM businesses WHERE id = $1";

const SELECT_USER: &str =
    "SELECT id, business_id, email, password_hash, display_name, created_at FROM users";

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new business with its owner account
    pub async fn register(&self, input: RegisterBusinessInput) -> AppResult<AuthResponse> {
        validate_name(&input.business_name).map_err(|msg| AppError::Validation {
            field: "businessName".to_string(),
            message: msg.to_string(),
        })?;
        validate_name(&input.owner_name).map_err(|msg| AppError::Validation {
            field: "ownerName".to_string(),
            message: msg.to_string(),
        })?;
        validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
        validate_password(&input.password).map_err(|msg| AppError::Validation {
            field: "password".to_string(),
            message: msg.to_string(),
        })?;

        // Check if the email is already registered
        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind(&input.email)
                .fetch_one(&self.db)
                .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let business = sqlx::query_as::<_, BusinessRow>(
            r#"
            INSERT INTO businesses (name, business_type)
            VALUES ($1, $2)
            RETURNING id, name, business_type, created_at, updated_at
            "#,
        )
        .bind(&input.business_name)
        .bind(input.business_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (business_id, email, password_hash, display_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, business_id, email, password_hash, display_name, created_at
            "#,
        )
        .bind(business.id)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.owner_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.build_response(user.into_user(), business.into_profile())
    }

    /// Authenticate with email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthResponse> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE email = $1", SELECT_USER))
            .bind(&input.email)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let business = self.get_business(row.business_id).await?;
        self.build_response(row.into_user(), business)
    }

    /// Get the current user together with their business profile
    pub async fn me(&self, user_id: Uuid) -> AppResult<(User, BusinessProfile)> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let business = self.get_business(row.business_id).await?;
        Ok((row.into_user(), business))
    }

    /// Get a business profile
    pub async fn get_business(&self, business_id: Uuid) -> AppResult<BusinessProfile> {
        let row = sqlx::query_as::<_, BusinessRow>(SELECT_BUSINESS)
            .bind(business_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Business".to_string()))?;
        Ok(row.into_profile())
    }

    /// Update the business profile
    pub async fn update_business(
        &self,
        business_id: Uuid,
        input: UpdateBusinessInput,
    ) -> AppResult<BusinessProfile> {
        let current = self.get_business(business_id).await?;

        let name = input.name.unwrap_or(current.name);
        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        let business_type = input.business_type.unwrap_or(current.business_type);

        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            UPDATE businesses
            SET name = $1, business_type = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, business_type, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(business_type.as_str())
        .bind(business_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_profile())
    }

    fn build_response(&self, user: User, business: BusinessProfile) -> AppResult<AuthResponse> {
        let token = self.issue_token(user.id, user.business_id)?;
        Ok(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            user,
            business,
        })
    }

    fn issue_token(&self, user_id: Uuid, business_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            business_id: business_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token creation failed: {}", e)))
    }
}
