//! Azure CLI credential provider for Microsoft Graph

use super::TokenProvider;
use crate::error::TransportError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use azure_core::credentials::TokenCredential;
use azure_identity::AzureCliCredential;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Re-acquire at the latest after this long, whatever the token claims
const TOKEN_REFRESH_AFTER: TimeDelta = TimeDelta::minutes(45);
/// Never hand out a token this close to its expiry
const EXPIRY_MARGIN: TimeDelta = TimeDelta::minutes(5);

struct CachedToken {
    secret: String,
    acquired: DateTime<Utc>,
    expires_on: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        is_fresh(self.acquired, self.expires_on, now)
    }
}

/// The Azure CLI returns its own cached token, which may be close to expiry
fn is_fresh(acquired: DateTime<Utc>, expires_on: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - acquired < TOKEN_REFRESH_AFTER && expires_on - now > EXPIRY_MARGIN
}

/// Authenticator that uses the signed-in Azure CLI account to call Graph
pub struct AzureAuthenticator {
    credential: Arc<AzureCliCredential>,
    scope: String,
    cached_token: RwLock<Option<CachedToken>>,
}

impl AzureAuthenticator {
    /// Create a new authenticator for the given Graph endpoint
    ///
    /// # Arguments
    /// * `graph_url` - The Graph root (e.g., "https://graph.microsoft.com")
    pub fn new(graph_url: &str) -> Result<Self> {
        let credential = AzureCliCredential::new()
            .context("Failed to create Azure CLI credential")?;

        Ok(Self {
            credential,
            scope: graph_scope(graph_url),
            cached_token: RwLock::new(None),
        })
    }

    async fn fetch_token(&self) -> Result<CachedToken, TransportError> {
        let token = self
            .credential
            .get_token(&[self.scope.as_str()])
            .await
            .map_err(|e| {
                TransportError::Auth(format!(
                    "Failed to get token from Azure CLI, make sure you're logged in with 'az login': {e}"
                ))
            })?;

        let acquired = Utc::now();
        let expires_on = DateTime::from_timestamp(token.expires_on.unix_timestamp(), 0)
            .unwrap_or(acquired);

        Ok(CachedToken {
            secret: token.token.secret().to_string(),
            acquired,
            expires_on,
        })
    }
}

#[async_trait]
impl TokenProvider for AzureAuthenticator {
    async fn token(&self) -> Result<String, TransportError> {
        if let Some(cached) = self.cached_token.read().await.as_ref() {
            if cached.is_fresh(Utc::now()) {
                return Ok(cached.secret.clone());
            }
        }

        let mut slot = self.cached_token.write().await;
        // another task may have refreshed while we waited for the lock
        if let Some(cached) = slot.as_ref() {
            if cached.is_fresh(Utc::now()) {
                return Ok(cached.secret.clone());
            }
        }

        tracing::debug!(scope = %self.scope, "acquiring Graph token from Azure CLI");
        let token = self.fetch_token().await?;
        tracing::debug!(expires_on = %token.expires_on, "Graph token acquired");
        let secret = token.secret.clone();
        *slot = Some(token);
        Ok(secret)
    }
}

/// `.default` scope for a Graph root URL
fn graph_scope(graph_url: &str) -> String {
    format!("{}/.default", graph_url.trim_end_matches('/'))
}
