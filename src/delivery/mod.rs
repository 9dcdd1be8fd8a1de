//! Notification delivery gateway.
//!
//! `send` walks an ordered list of endpoints. Each endpoint gets a bounded
//! number of attempts with exponential backoff between them (capped); the
//! first attempt starts with a connectivity probe, and a failed probe burns
//! that attempt rather than skipping the endpoint. The first successful
//! delivery wins. When every endpoint is exhausted the gateway reports
//! `delivered = false` with the last error — failures are logged per attempt
//! but never raised, so a dead mail provider can never block the recovery
//! flow from answering.

use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

pub mod transport;

pub use transport::{Endpoint, HttpTransport, LogTransport, Notification, NotificationTransport};

const DEFAULT_MAX_ATTEMPTS_PER_ENDPOINT: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(3);
const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry policy: attempts per endpoint, backoff shape, per-attempt deadline.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    max_attempts_per_endpoint: u32,
    base_delay: Duration,
    max_delay: Duration,
    attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Default policy: 3 attempts per endpoint, 1s -> 3s capped backoff,
    /// 10s deadline per attempt.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_attempts_per_endpoint: DEFAULT_MAX_ATTEMPTS_PER_ENDPOINT,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_max_attempts_per_endpoint(mut self, attempts: u32) -> Self {
        self.max_attempts_per_endpoint = attempts;
        self
    }

    #[must_use]
    pub fn with_base_delay_seconds(mut self, seconds: u64) -> Self {
        self.base_delay = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_max_delay_seconds(mut self, seconds: u64) -> Self {
        self.max_delay = Duration::from_secs(seconds);
        self
    }

    #[must_use]
    pub fn with_attempt_timeout_seconds(mut self, seconds: u64) -> Self {
        self.attempt_timeout = Duration::from_secs(seconds);
        self
    }

    /// Clamp degenerate values so a bad config cannot produce a busy loop
    /// or a policy that never attempts anything.
    #[must_use]
    pub fn normalize(self) -> Self {
        let max_attempts_per_endpoint = self.max_attempts_per_endpoint.max(1);
        let base_delay = if self.base_delay.is_zero() {
            Duration::from_millis(100)
        } else {
            self.base_delay
        };
        let max_delay = if self.max_delay < base_delay {
            base_delay
        } else {
            self.max_delay
        };
        let attempt_timeout = if self.attempt_timeout.is_zero() {
            Duration::from_secs(1)
        } else {
            self.attempt_timeout
        };
        Self {
            max_attempts_per_endpoint,
            base_delay,
            max_delay,
            attempt_timeout,
        }
    }

    #[must_use]
    pub fn max_attempts_per_endpoint(&self) -> u32 {
        self.max_attempts_per_endpoint
    }

    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Delay after `completed_attempts` failures on one endpoint:
    /// `min(base * 2^(completed_attempts - 1), max)`.
    #[must_use]
    pub fn backoff_delay(&self, completed_attempts: u32) -> Duration {
        let shift = completed_attempts.saturating_sub(1).min(31);
        let factor = 1u32 << shift;
        let delay = self.base_delay.checked_mul(factor).unwrap_or(self.max_delay);
        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate outcome of one `send` call. Diagnostic only; never an error.
#[derive(Clone, Debug)]
pub struct DeliveryReport {
    pub delivered: bool,
    pub endpoint_used: Option<String>,
    pub last_error: Option<String>,
    pub attempts: u32,
}

/// Walks endpoints in order, retrying each with backoff, stopping at the
/// first successful delivery.
pub struct DeliveryGateway {
    transport: Arc<dyn NotificationTransport>,
    endpoints: Vec<Endpoint>,
    policy: RetryPolicy,
}

impl DeliveryGateway {
    #[must_use]
    pub fn new(
        transport: Arc<dyn NotificationTransport>,
        endpoints: Vec<Endpoint>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            endpoints,
            policy: policy.normalize(),
        }
    }

    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Attempt delivery through the configured endpoints.
    ///
    /// Network-only side effects; no durable state is touched. The report is
    /// always returned, never an error.
    pub async fn send(&self, notification: &Notification) -> DeliveryReport {
        let max_attempts = self.policy.max_attempts_per_endpoint();
        let mut attempts = 0u32;
        let mut last_error = None;

        for endpoint in &self.endpoints {
            for attempt in 1..=max_attempts {
                attempts += 1;
                match self.attempt(endpoint, notification, attempt).await {
                    Ok(()) => {
                        info!(
                            endpoint = %endpoint.name,
                            attempt,
                            "notification delivered"
                        );
                        return DeliveryReport {
                            delivered: true,
                            endpoint_used: Some(endpoint.name.clone()),
                            last_error: None,
                            attempts,
                        };
                    }
                    Err(err) => {
                        warn!(
                            endpoint = %endpoint.name,
                            attempt,
                            max_attempts,
                            "delivery attempt failed: {err:#}"
                        );
                        last_error = Some(format!("{err:#}"));
                        if attempt < max_attempts {
                            sleep(self.policy.backoff_delay(attempt)).await;
                        }
                    }
                }
            }
        }

        warn!(attempts, "all delivery endpoints exhausted");
        DeliveryReport {
            delivered: false,
            endpoint_used: None,
            last_error,
            attempts,
        }
    }

    /// One attempt against one endpoint. The first attempt probes
    /// connectivity before delivering; a probe failure consumes the attempt.
    /// A per-attempt deadline turns a hung endpoint into a transient failure.
    async fn attempt(
        &self,
        endpoint: &Endpoint,
        notification: &Notification,
        attempt: u32,
    ) -> anyhow::Result<()> {
        let deadline = self.policy.attempt_timeout();
        let work = async {
            if attempt == 1 {
                self.transport.probe(endpoint).await?;
            }
            self.transport.deliver(endpoint, notification).await
        };
        match timeout(deadline, work).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!(
                "attempt deadline of {deadline:?} exceeded for {}",
                endpoint.name
            )),
        }
    }
}
