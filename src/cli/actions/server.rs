use crate::api;
use crate::api::handlers::RecoveryConfig;
use crate::credentials::{CredentialStore, HttpCredentialStore};
use crate::delivery::{
    DeliveryGateway, Endpoint, HttpTransport, LogTransport, NotificationTransport, RetryPolicy,
};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Handle the server action
pub async fn handle(port: u16, args: crate::cli::globals::ServerArgs) -> Result<()> {
    let policy = RetryPolicy::new()
        .with_max_attempts_per_endpoint(args.max_attempts_per_endpoint)
        .with_base_delay_seconds(args.base_delay_seconds)
        .with_max_delay_seconds(args.max_delay_seconds)
        .with_attempt_timeout_seconds(args.attempt_timeout_seconds);

    let endpoints = args
        .endpoints
        .iter()
        .map(|url| Endpoint::parse(url))
        .collect::<Result<Vec<_>>>()?;

    // Without configured endpoints the gateway logs notifications instead of
    // sending them, so local runs need no outbound network.
    let gateway = if endpoints.is_empty() {
        warn!("no delivery endpoints configured, notifications will only be logged");
        let stub = Endpoint {
            name: "log".to_string(),
            url: "log://local".to_string(),
        };
        DeliveryGateway::new(Arc::new(LogTransport), vec![stub], policy)
    } else {
        let transport = HttpTransport::new(
            Duration::from_secs(args.attempt_timeout_seconds),
            args.delivery_token.clone(),
        )?;
        DeliveryGateway::new(
            Arc::new(transport) as Arc<dyn NotificationTransport>,
            endpoints,
            policy,
        )
    };

    let credentials: Arc<dyn CredentialStore> = Arc::new(HttpCredentialStore::new(
        &args.credential_store_url,
        Duration::from_secs(args.attempt_timeout_seconds),
    )?);

    let config = RecoveryConfig::new(args.base_url.clone())
        .with_token_ttl_hours(args.token_ttl_hours)
        .with_purge_interval_seconds(args.purge_interval_seconds)
        .with_min_secret_length(args.min_secret_length)
        .with_expose_diagnostics(args.expose_diagnostics);

    api::new(port, config, gateway, credentials).await?;

    Ok(())
}
