//! Recovery token store.
//!
//! Tokens are single-use bearer credentials: whoever presents one may reset
//! the secret of the principal it was issued for. They are therefore
//! generated from `OsRng` (256 bits) and kept server-side keyed by the token
//! string, with a validity window and a `consumed` flag that only ever flips
//! from `false` to `true`.
//!
//! The store is process-wide shared state behind a `tokio::sync::Mutex`;
//! `consume` performs its read-check-write under a single lock guard so two
//! concurrent consumers of the same token cannot both win. Expired entries
//! report invalid immediately and are removed later by the purge sweep, so
//! the sweep cadence never affects correctness.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Why a token failed validation or consumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    NotFound,
    Expired,
    AlreadyConsumed,
}

impl InvalidReason {
    /// Stable reason code surfaced on the reset path.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "token_not_found",
            Self::Expired => "token_expired",
            Self::AlreadyConsumed => "token_already_used",
        }
    }
}

#[derive(Clone, Debug)]
struct RecoveryToken {
    principal: String,
    issued_at: Instant,
    consumed: bool,
}

impl RecoveryToken {
    fn expired(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.issued_at) > ttl
    }
}

/// Keyed store of recovery tokens with expiry and one-time consumption.
#[derive(Debug)]
pub struct TokenStore {
    ttl: Duration,
    tokens: Mutex<HashMap<String, RecoveryToken>>,
}

impl TokenStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh token for a principal.
    ///
    /// Multiple live tokens per principal are allowed: a new request does not
    /// invalidate earlier ones, so a user who lost the first link can retry.
    ///
    /// # Errors
    ///
    /// Returns an error only if the system random source fails.
    pub async fn issue(&self, principal: &str) -> Result<String> {
        let token = generate_token()?;
        let entry = RecoveryToken {
            principal: principal.to_string(),
            issued_at: Instant::now(),
            consumed: false,
        };
        self.tokens.lock().await.insert(token.clone(), entry);
        Ok(token)
    }

    /// Read-only validity check: a token is valid iff it exists, has not
    /// expired, and has not been consumed.
    pub async fn validate(&self, token: &str) -> Result<(), InvalidReason> {
        let tokens = self.tokens.lock().await;
        let entry = tokens.get(token).ok_or(InvalidReason::NotFound)?;
        if entry.expired(self.ttl, Instant::now()) {
            return Err(InvalidReason::Expired);
        }
        if entry.consumed {
            return Err(InvalidReason::AlreadyConsumed);
        }
        Ok(())
    }

    /// Atomically re-check validity and mark the token consumed.
    ///
    /// The check and the flip happen under one lock guard, so of N concurrent
    /// calls on the same token exactly one receives the principal; the rest
    /// see `AlreadyConsumed`.
    pub async fn consume(&self, token: &str) -> Result<String, InvalidReason> {
        let mut tokens = self.tokens.lock().await;
        let entry = tokens.get_mut(token).ok_or(InvalidReason::NotFound)?;
        if entry.expired(self.ttl, Instant::now()) {
            return Err(InvalidReason::Expired);
        }
        if entry.consumed {
            return Err(InvalidReason::AlreadyConsumed);
        }
        entry.consumed = true;
        Ok(entry.principal.clone())
    }

    /// Drop expired entries. Idempotent; validity checks never depend on it.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|_, entry| !entry.expired(self.ttl, now));
        before - tokens.len()
    }

    /// Number of stored tokens, consumed and expired entries included.
    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.lock().await.is_empty()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_TTL)
    }
}

/// Spawn a background task that periodically purges expired tokens so the
/// store does not grow without bound.
pub fn spawn_purge_sweep(
    store: Arc<TokenStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(interval).await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                info!(removed, "purged expired recovery tokens");
            } else {
                debug!("purge sweep found no expired tokens");
            }
        }
    })
}

/// Generate an unguessable token identifier: 32 bytes from the OS random
/// source, URL-safe base64 without padding.
fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate recovery token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
