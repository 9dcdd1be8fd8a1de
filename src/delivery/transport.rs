//! Transport abstraction for notification delivery.
//!
//! The gateway is transport-agnostic: any addressable channel that can answer
//! a connectivity probe and accept a payload works. Production wiring uses
//! [`HttpTransport`] (webhook POST per endpoint); local dev without outbound
//! network uses [`LogTransport`], which logs the payload and reports success.

use crate::api::APP_USER_AGENT;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::info;
use url::Url;

/// One addressable delivery target among the ordered fallback list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
}

impl Endpoint {
    /// Build an endpoint from a URL, naming it after its host for logs.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or has no host.
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).with_context(|| format!("invalid endpoint URL: {url}"))?;
        let host = parsed
            .host_str()
            .with_context(|| format!("endpoint URL has no host: {url}"))?;
        Ok(Self {
            name: host.to_string(),
            url: parsed.to_string(),
        })
    }
}

/// The notification payload handed to a transport.
#[derive(Clone, Debug)]
pub struct Notification {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

/// Delivery abstraction used by the gateway.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Cheap connectivity check against an endpoint.
    async fn probe(&self, endpoint: &Endpoint) -> Result<()>;

    /// Deliver a notification or return an error to trigger a retry.
    async fn deliver(&self, endpoint: &Endpoint, notification: &Notification) -> Result<()>;
}

/// Webhook transport: HEAD to probe, POST the notification as JSON.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    bearer_token: Option<SecretString>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(attempt_timeout: Duration, bearer_token: Option<SecretString>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(attempt_timeout)
            .build()
            .context("failed to build delivery HTTP client")?;
        Ok(Self {
            client,
            bearer_token,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl NotificationTransport for HttpTransport {
    async fn probe(&self, endpoint: &Endpoint) -> Result<()> {
        let response = self
            .authorize(self.client.head(&endpoint.url))
            .send()
            .await
            .with_context(|| format!("connectivity check failed for {}", endpoint.name))?;

        // Any HTTP answer proves the endpoint is reachable; method support
        // varies between providers, so the status itself is not checked.
        let _ = response;
        Ok(())
    }

    async fn deliver(&self, endpoint: &Endpoint, notification: &Notification) -> Result<()> {
        let payload = serde_json::json!({
            "to": notification.to_email,
            "subject": notification.subject,
            "body": notification.body,
        });

        let response = self
            .authorize(self.client.post(&endpoint.url))
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("delivery request to {} failed", endpoint.name))?;

        let status = response.status();
        if !status.is_success() {
            bail!("endpoint {} rejected notification: {status}", endpoint.name);
        }
        Ok(())
    }
}

/// Local dev transport that logs the payload instead of sending it.
#[derive(Clone, Debug)]
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn probe(&self, _endpoint: &Endpoint) -> Result<()> {
        Ok(())
    }

    async fn deliver(&self, endpoint: &Endpoint, notification: &Notification) -> Result<()> {
        info!(
            endpoint = %endpoint.name,
            to_email = %notification.to_email,
            subject = %notification.subject,
            body = %notification.body,
            "notification delivery stub"
        );
        Ok(())
    }
}
