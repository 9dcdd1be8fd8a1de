//! Client for the external credential store.
//!
//! The store itself is another service; all this crate does is forward the
//! new secret for a principal after a recovery token has been consumed.

use crate::api::APP_USER_AGENT;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// External credential store: `set_password(principal, new_secret)`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Replace the stored secret for a principal.
    async fn set_password(&self, principal: &str, new_secret: &SecretString) -> Result<()>;
}

/// HTTP client for the credential store's password endpoint.
pub struct HttpCredentialStore {
    client: Client,
    base_url: String,
}

impl HttpCredentialStore {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build credential store client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CredentialStore for HttpCredentialStore {
    async fn set_password(&self, principal: &str, new_secret: &SecretString) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/password", self.base_url))
            .json(&serde_json::json!({
                "principal": principal,
                "password": new_secret.expose_secret(),
            }))
            .send()
            .await
            .context("credential store request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("credential store rejected password update: {status}");
        }
        Ok(())
    }
}
