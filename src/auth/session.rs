use crate::error::AppError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: User,
}

/// Client for the backend's hosted auth provider (GoTrue REST endpoints).
#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Password grant. Returns the session whose access token authorizes table reads.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        info!(email, "signing in");
        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let session: Session = response
                    .json()
                    .await
                    .map_err(|e| AppError::Auth(e.to_string()))?;
                info!(user_id = %session.user.id, "signed in");
                Ok(session)
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                error!(%status, "sign-in rejected");
                Err(AppError::Auth(format!("sign-in rejected ({}): {}", status, message)))
            }
        }
    }

    /// The user owning `access_token`, `None` when the token is no longer valid.
    pub async fn current_user(&self, access_token: &str) -> Result<Option<User>, AppError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(Some(
                response
                    .json()
                    .await
                    .map_err(|e| AppError::Auth(e.to_string()))?,
            )),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(AppError::Auth(format!("user lookup failed ({})", status))),
        }
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        if response.status().is_success() {
            info!("signed out");
            Ok(())
        } else {
            Err(AppError::Auth(format!(
                "sign-out failed ({})",
                response.status()
            )))
        }
    }
}
