use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::create_token;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct ElevationResponse {
    pub token: String,
    pub expires_in_seconds: i64,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn verify_credentials(
    state: &AppState,
    username: &str,
    password: &str,
) -> AppResult<user::Model> {
    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username.trim()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid username or password".to_string()))?;

    Ok(user)
}

/// Create the admin account on first start
pub async fn seed_admin(state: &AppState) -> AppResult<()> {
    let username = state.config.admin_username.trim();

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await?;

    if existing.is_none() {
        let admin = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            password_hash: Set(hash_password(&state.config.admin_password)?),
            role: Set(UserRole::Admin),
            created_at: Set(Utc::now().into()),
        };

        admin.insert(&state.db).await?;
        tracing::info!("Admin account created: {}", username);
    }

    Ok(())
}

/// Register a regular (non-admin) account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let username = payload.username.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must have at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        password_hash: Set(hash_password(&payload.password)?),
        role: Set(UserRole::User),
        created_at: Set(Utc::now().into()),
    };

    let user = new_user
        .insert(&state.db)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Username already taken"))?;

    let token = create_token(
        user.id,
        &user.username,
        user.role,
        false,
        &state.config.jwt_secret,
        Duration::hours(state.config.jwt_expiration_hours),
    )?;

    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            username: user.username,
            role: user.role,
        },
    }))
}

/// Login with username and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = verify_credentials(&state, &payload.username, &payload.password).await?;

    let token = create_token(
        user.id,
        &user.username,
        user.role,
        false,
        &state.config.jwt_secret,
        Duration::hours(state.config.jwt_expiration_hours),
    )?;

    tracing::info!(user = %user.username, role = ?user.role, "Login");

    Ok(Json(AuthResponse {
        token,
        user: UserInfo {
            id: user.id,
            username: user.username,
            role: user.role,
        },
    }))
}

/// Admin re-authorization: an admin types their credentials on someone else's
/// session and gets a short-lived admin token for the pending action.
pub async fn elevate(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ElevationResponse>> {
    let user = verify_credentials(&state, &payload.username, &payload.password).await?;

    if user.role != UserRole::Admin {
        tracing::warn!(user = %user.username, "Elevation refused for non-admin account");
        return Err(AppError::Forbidden("Admin credentials required".to_string()));
    }

    let lifetime = Duration::minutes(state.config.elevation_minutes);
    let token = create_token(
        user.id,
        &user.username,
        user.role,
        true,
        &state.config.jwt_secret,
        lifetime,
    )?;

    tracing::info!(user = %user.username, minutes = state.config.elevation_minutes, "Elevated token issued");

    Ok(Json(ElevationResponse {
        token,
        expires_in_seconds: lifetime.num_seconds(),
    }))
}
