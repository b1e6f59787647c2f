//! Remote side of the dashboard: the snapshot read and the toggle write

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::applications::ApplicationsSnapshot;
use crate::auth::models::{LoginRequest, LoginResponse};
use crate::selections::models::{ToggleSelectionRequest, ToggleSelectionResponse};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Could not write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Operations the dashboard needs from the server
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// Applications plus the caller's selections
    async fn fetch_snapshot(&self) -> Result<ApplicationsSnapshot, DashboardError>;

    /// Asks the server to flip one selection; returns the server's resulting membership
    async fn toggle_selection(
        &self,
        application_id: &str,
        subject: &str,
    ) -> Result<bool, DashboardError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Talks to the `shortlist_api` server with a bearer token
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    pub fn with_token(client: Client, base_url: &str, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Signs in and keeps the issued token
    pub async fn login(
        client: Client,
        base_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, DashboardError> {
        let base_url = base_url.trim_end_matches('/');
        let response = client
            .post(format!("{}/api/auth/login", base_url))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let login: LoginResponse = Self::parse(response).await?;
        debug!(user_id = %login.user.id, "Dashboard session established");

        Ok(Self::with_token(client, base_url, login.token))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, DashboardError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("HTTP {}", status));
        warn!(http_status = %status, error = %message, "Dashboard request rejected");

        Err(DashboardError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DashboardBackend for HttpBackend {
    async fn fetch_snapshot(&self) -> Result<ApplicationsSnapshot, DashboardError> {
        let response = self
            .authorized(self.client.get(format!("{}/api/applications", self.base_url)))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn toggle_selection(
        &self,
        application_id: &str,
        subject: &str,
    ) -> Result<bool, DashboardError> {
        let response = self
            .authorized(
                self.client
                    .post(format!("{}/api/selections/toggle", self.base_url)),
            )
            .json(&ToggleSelectionRequest {
                application_id: application_id.to_string(),
                subject: subject.to_string(),
            })
            .send()
            .await?;

        let body: ToggleSelectionResponse = Self::parse(response).await?;
        Ok(body.selected)
    }
}
