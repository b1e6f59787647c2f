//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::{Claims, StaffRole, StaffUser};
use crate::common::{safe_username_log, ApiError, AppState};

/// Authenticated staff member extractor
///
/// Validates the bearer JWT and loads the staff record. Admin rights come
/// from the stored role or the `ADMIN_USERNAMES` list.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
}

impl AuthedUser {
    pub fn from_staff(user: &StaffUser, state: &AppState) -> Self {
        let is_admin = user.role() == StaffRole::Admin
            || state
                .config
                .admin_usernames
                .contains(&user.username.to_lowercase());
        AuthedUser {
            id: user.id.clone(),
            username: user.username.clone(),
            is_admin,
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            warn!(user_id = %self.id, "Access denied: admin privileges required");
            Err(ApiError::Forbidden("Admin privileges required".to_string()))
        }
    }
}

/// Strips an optional `Bearer ` prefix
pub fn bare_token(header_value: &str) -> &str {
    header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value)
        .trim()
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        // DEV MODE: Bypass authentication completely
        if app_state.dev_mode.is_enabled() {
            let dev_user = app_state
                .dev_mode
                .create_dev_user(&app_state.config.login_email_domain);
            let authed = AuthedUser::from_staff(&dev_user, &app_state);

            debug!(
                user_id = %authed.id,
                username = %safe_username_log(&authed.username),
                is_admin = authed.is_admin,
                "DEV MODE: Authentication bypassed"
            );

            return Ok(authed);
        }

        let token = match parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
        {
            Some(t) => bare_token(t).to_string(),
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        let decoded = match decode::<Claims>(
            &token,
            &DecodingKey::from_secret(app_state.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "JWT token validation failed");
                return Err(ApiError::Unauthorized("invalid token".into()));
            }
        };

        let user_id = decoded.claims.sub;

        let user: Option<StaffUser> =
            sqlx::query_as::<_, StaffUser>("SELECT * FROM staff_users WHERE id = ?")
                .bind(&user_id)
                .fetch_optional(&app_state.db)
                .await
                .map_err(|e| {
                    error!(
                        error = %e,
                        user_id = %user_id,
                        "Database error during staff lookup in authentication"
                    );
                    ApiError::DatabaseError(e)
                })?;

        match user {
            Some(u) => {
                let authed = AuthedUser::from_staff(&u, &app_state);
                debug!(
                    user_id = %authed.id,
                    username = %safe_username_log(&authed.username),
                    is_admin = authed.is_admin,
                    "Staff authentication successful via extractor"
                );
                Ok(authed)
            }
            None => {
                warn!(user_id = %user_id, "Authentication failed: staff user not found in database");
                Err(ApiError::Unauthorized("user not found".into()))
            }
        }
    }
}
