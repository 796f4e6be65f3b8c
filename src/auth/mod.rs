//! Auth module for Microsoft Graph access
//!
//! Tokens come from the Azure CLI login, or from a pre-issued bearer token
//! (`--token`) for unattended runs.

mod azure_cli;

pub use azure_cli::AzureAuthenticator;

use crate::error::TransportError;
use async_trait::async_trait;

/// Source of bearer tokens for Graph requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, TransportError>;
}

/// A bearer token handed in from outside
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, TransportError> {
        Ok(self.0.clone())
    }
}
