//! Bearer token acquisition for the Appserver

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::serde_util::opt_u64_lenient;

/// Source of the token sent in the `A4SAuthorization` header
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed, pre-issued token
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Token endpoint response; `expires_in` arrives as a number or a string
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "opt_u64_lenient")]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Exchanges configured credentials for a token with the password grant.
///
/// Tokens are reused until `expires_in` minus the refresh margin has
/// elapsed. Tokens without an expiry are never cached.
pub struct PlatformService {
    client: reqwest::Client,
    token_url: String,
    form: Vec<(&'static str, String)>,
    refresh_margin: Duration,
    cached: RwLock<Option<CachedToken>>,
}

impl PlatformService {
    pub fn new(client: reqwest::Client, config: &Config) -> Result<Self> {
        let platform = &config.platform;
        let token_url = platform
            .token_url
            .clone()
            .ok_or_else(|| Error::Config("platform.token_url is not set".into()))?;
        let username = platform
            .username
            .clone()
            .ok_or_else(|| Error::Config("platform.username is not set".into()))?;

        let form = vec![
            ("username", username),
            ("password", platform.password.clone().unwrap_or_default()),
            ("grant_type", "password".to_string()),
            ("scope", platform.effective_scope()),
            ("client_id", platform.client_id.clone().unwrap_or_default()),
            ("response_type", platform.response_type.clone()),
        ];

        Ok(Self {
            client,
            token_url,
            form,
            refresh_margin: Duration::from_secs(platform.token_refresh_margin_secs),
            cached: RwLock::new(None),
        })
    }

    /// Form fields posted to the token endpoint
    pub fn form_fields(&self) -> &[(&'static str, String)] {
        &self.form
    }

    /// Drop the cached token so the next call performs a fresh grant
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    async fn request_token(&self) -> Result<TokenResponse> {
        tracing::debug!("Requesting access token from {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .form(&self.form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Token request failed with {}: {}", status, body);
            return Err(Error::Auth(format!(
                "Token endpoint returned {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse token response: {}", e);
            Error::Auth(format!("Invalid token response: {}", e))
        })?;

        Ok(token)
    }
}

#[async_trait]
impl TokenProvider for PlatformService {
    async fn access_token(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if Instant::now() < token.refresh_at {
                    return Ok(token.value.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let response = self.request_token().await?;
        let value = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Auth("Token response has no access_token".into()))?;

        *cached = response
            .expires_in
            .map(Duration::from_secs)
            .filter(|lifetime| *lifetime > self.refresh_margin)
            .map(|lifetime| CachedToken {
                value: value.clone(),
                refresh_at: Instant::now() + (lifetime - self.refresh_margin),
            });

        tracing::debug!("Obtained access token (expires_in: {:?})", response.expires_in);
        Ok(value)
    }
}

/// Pick the token source the config asks for
pub fn token_provider(config: &Config, client: reqwest::Client) -> Result<Arc<dyn TokenProvider>> {
    match &config.platform.access_token {
        Some(token) => Ok(Arc::new(StaticToken::new(token.clone()))),
        None => Ok(Arc::new(PlatformService::new(client, config)?)),
    }
}
