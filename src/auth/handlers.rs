//! Authentication handlers

use axum::extract::{Extension, Json};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{
    ChangePasswordRequest, Claims, LoginRequest, LoginResponse, SessionUser, StaffRole, StaffUser,
};
use super::provider::ProviderUser;
use super::validators::{LoginValidator, PasswordValidator};
use crate::common::{safe_username_log, ApiError, AppConfig, AppState, Validator};

/// Signs a session token for a staff user
pub fn issue_token(user: &StaffUser, secret: &str, ttl_hours: i64) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = Claims {
        sub: user.id.clone(),
        username: user.username.clone(),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %user.id,
            "JWT encoding error during authentication"
        );
        ApiError::InternalServer("jwt error".to_string())
    })
}

/// Finds the staff record for a provider account, creating it on first sign-in
pub async fn ensure_staff_user(
    db: &SqlitePool,
    config: &AppConfig,
    account: &ProviderUser,
    username: &str,
) -> Result<StaffUser, ApiError> {
    let username = username.trim().to_lowercase();
    let role = if config.admin_usernames.contains(&username) {
        StaffRole::Admin
    } else {
        StaffRole::Professor
    };
    let email = account
        .email
        .clone()
        .unwrap_or_else(|| config.login_email(&username));

    sqlx::query(
        "INSERT OR IGNORE INTO staff_users (id, username, email, role, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&account.id)
    .bind(&username)
    .bind(&email)
    .bind(role.as_str())
    .bind(Utc::now().to_rfc3339())
    .execute(db)
    .await
    .map_err(|e| {
        error!(error = %e, user_id = %account.id, "Database error registering staff user");
        ApiError::DatabaseError(e)
    })?;

    sqlx::query_as::<_, StaffUser>("SELECT * FROM staff_users WHERE id = ?")
        .bind(&account.id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| {
            warn!(
                user_id = %account.id,
                username = %safe_username_log(&username),
                "Username already belongs to another account"
            );
            ApiError::Forbidden("Account is not registered for this dashboard".to_string())
        })
}

/// POST /api/auth/login
/// Signs a staff member in with username and password
///
/// # Request Body
/// ```json
/// { "username": "admin", "password": "..." }
/// ```
///
/// # Response
/// ```json
/// { "token": "<jwt token>", "user": { ... } }
/// ```
pub async fn login_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = LoginValidator.validate(&payload);
    if !validation.is_valid {
        warn!(errors = ?validation.errors, "Login validation failed");
        return Err(ApiError::from(validation));
    }

    let username = payload.username.trim().to_lowercase();
    let email = state.config.login_email(&username);

    info!(username = %safe_username_log(&username), "🔐 Received login request");

    let account = state.identity.sign_in(&email, &payload.password).await?;
    let user = ensure_staff_user(&state.db, &state.config, &account, &username).await?;
    let token = issue_token(&user, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;
    let authed = AuthedUser::from_staff(&user, &state);

    info!(
        user_id = %user.id,
        username = %safe_username_log(&user.username),
        is_admin = authed.is_admin,
        "Staff login successful"
    );

    Ok(Json(LoginResponse {
        token,
        user: SessionUser {
            id: user.id,
            username: user.username,
            role: user.role,
            is_admin: authed.is_admin,
        },
    }))
}

/// POST /api/auth/logout
/// Tokens are stateless; the client discards its copy
pub async fn logout_handler(authed: AuthedUser) -> Json<serde_json::Value> {
    info!(user_id = %authed.id, "Staff logout");
    Json(serde_json::json!({ "success": true }))
}

/// POST /api/auth/password
/// Changes the current staff member's password at the identity provider
pub async fn change_password_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = PasswordValidator.validate(&payload);
    if !validation.is_valid {
        let message = validation
            .first_message()
            .unwrap_or("Invalid password")
            .to_string();
        warn!(user_id = %authed.id, "Password change rejected by validation");
        return Err(ApiError::ValidationError(message));
    }

    state
        .identity
        .update_password(&authed.id, &payload.password)
        .await?;

    info!(user_id = %authed.id, "Password changed");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/me
/// Returns the current authenticated staff member
pub async fn me_handler(authed: AuthedUser) -> Json<SessionUser> {
    let role = if authed.is_admin {
        StaffRole::Admin
    } else {
        StaffRole::Professor
    };

    Json(SessionUser {
        id: authed.id,
        username: authed.username,
        role: role.as_str().to_string(),
        is_admin: authed.is_admin,
    })
}
