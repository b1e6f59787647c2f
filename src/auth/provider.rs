//! Client for the hosted identity provider that owns staff passwords
//!
//! The provider speaks the GoTrue REST dialect: password grant for sign-in
//! and the admin user endpoints for provisioning and password changes.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::common::helpers::safe_email_log;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Identity provider is not configured")]
    NotConfigured,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("Identity provider request failed: {0}")]
    RequestFailed(String),
}

/// Account as reported by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PasswordGrantResponse {
    user: ProviderUser,
}

/// Error bodies come in several shapes depending on the endpoint
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ProviderErrorBody {
    fn into_message(self, status: StatusCode) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| format!("HTTP {}", status))
    }
}

#[derive(Debug, Clone)]
pub struct IdentityProvider {
    client: Client,
    base_url: Option<String>,
    service_key: Option<String>,
}

impl IdentityProvider {
    pub fn new(client: Client, base_url: Option<String>, service_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
            service_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.service_key.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<(String, &str), ProviderError> {
        match (&self.base_url, &self.service_key) {
            (Some(base), Some(key)) => Ok((format!("{}{}", base, path), key.as_str())),
            _ => Err(ProviderError::NotConfigured),
        }
    }

    fn authorize(request: RequestBuilder, key: &str) -> RequestBuilder {
        request.header("apikey", key).bearer_auth(key)
    }

    /// Verifies an email/password pair and returns the provider account
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, ProviderError> {
        let (url, key) = self.endpoint("/auth/v1/token?grant_type=password")?;

        debug!(email = %safe_email_log(email), "Verifying credentials with identity provider");

        let response = self
            .client
            .post(&url)
            .header("apikey", key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            warn!(
                email = %safe_email_log(email),
                http_status = %status,
                "Identity provider rejected credentials"
            );
            return Err(ProviderError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = response.json::<ProviderErrorBody>().await.unwrap_or_default();
            let message = body.into_message(status);
            error!(http_status = %status, error = %message, "Identity provider sign-in failed");
            return Err(ProviderError::Rejected(message));
        }

        let grant = response
            .json::<PasswordGrantResponse>()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        Ok(grant.user)
    }

    /// Sets a new password for an existing account
    pub async fn update_password(&self, user_id: &str, password: &str) -> Result<(), ProviderError> {
        let (url, key) = self.endpoint(&format!("/auth/v1/admin/users/{}", user_id))?;

        let response = Self::authorize(self.client.put(&url), key)
            .json(&serde_json::json!({ "password": password }))
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ProviderErrorBody>().await.unwrap_or_default();
            let message = body.into_message(status);
            warn!(user_id = %user_id, http_status = %status, error = %message, "Password update rejected");
            return Err(ProviderError::Rejected(message));
        }

        Ok(())
    }

    /// Creates a confirmed account
    pub async fn create_user(&self, email: &str, password: &str) -> Result<ProviderUser, ProviderError> {
        let (url, key) = self.endpoint("/auth/v1/admin/users")?;

        let response = Self::authorize(self.client.post(&url), key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ProviderErrorBody>().await.unwrap_or_default();
            return Err(ProviderError::Rejected(body.into_message(status)));
        }

        response
            .json::<ProviderUser>()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))
    }
}
