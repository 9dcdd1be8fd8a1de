//! Password reset endpoint.
//!
//! Unlike `/recover`, this path may reveal why a token is invalid: the caller
//! already holds the token, so there is no enumeration concern. Checks run in
//! order: confirmation match, secret strength, token validity, atomic
//! consumption, then the credential store call. The token is spent the moment
//! consumption succeeds; a credential store failure after that point is
//! logged as an inconsistency and surfaced as a generic failure.

use axum::{extract::Extension, http::StatusCode, Json};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::state::RecoveryConfig;
use super::types::{ResetRequest, ResetResponse};
use super::utils::strong_secret;
use crate::credentials::CredentialStore;
use crate::tokens::{InvalidReason, TokenStore};

/// Reset a principal's secret with a previously issued recovery token.
#[utoipa::path(
    post,
    path = "/reset",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Secret updated", body = ResetResponse),
        (status = 400, description = "Invalid token or secret", body = ResetResponse),
        (status = 500, description = "Credential store failure", body = ResetResponse),
    ),
    tag = "recovery"
)]
#[instrument(skip(tokens, credentials, config, payload))]
pub async fn reset(
    tokens: Extension<Arc<TokenStore>>,
    credentials: Extension<Arc<dyn CredentialStore>>,
    config: Extension<Arc<RecoveryConfig>>,
    payload: Option<Json<ResetRequest>>,
) -> (StatusCode, Json<ResetResponse>) {
    let request: ResetRequest = match payload {
        Some(Json(payload)) => payload,
        None => return failure(StatusCode::BAD_REQUEST, None, "Missing payload"),
    };

    let token = request.token.trim();
    if token.is_empty() {
        return failure(
            StatusCode::BAD_REQUEST,
            Some(InvalidReason::NotFound.as_str()),
            "Missing recovery token",
        );
    }

    if request.new_secret != request.confirm_secret {
        return failure(
            StatusCode::BAD_REQUEST,
            Some("secrets_mismatch"),
            "Secret and confirmation do not match",
        );
    }

    if !strong_secret(&request.new_secret, config.min_secret_length()) {
        return failure(
            StatusCode::BAD_REQUEST,
            Some("weak_secret"),
            "New secret does not meet the minimum length",
        );
    }

    if let Err(reason) = tokens.validate(token).await {
        return invalid_token(reason);
    }

    // Validity may change between the check above and here; consumption
    // re-checks atomically and exactly one caller can win.
    let principal = match tokens.consume(token).await {
        Ok(principal) => principal,
        Err(reason) => return invalid_token(reason),
    };

    let new_secret = SecretString::from(request.new_secret);
    match credentials.set_password(&principal, &new_secret).await {
        Ok(()) => {
            info!(principal = %principal, "credential updated through recovery token");
            (
                StatusCode::OK,
                Json(ResetResponse {
                    success: true,
                    reason: None,
                    message: "Your password has been updated".to_string(),
                }),
            )
        }
        Err(err) => {
            // The token is already spent and single-use by design, so this is
            // an accepted inconsistency rather than something to roll back.
            error!(
                principal = %principal,
                "credential store rejected update after token consumption: {err:#}"
            );
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                "Unable to update the password, request a new recovery link",
            )
        }
    }
}

fn invalid_token(reason: InvalidReason) -> (StatusCode, Json<ResetResponse>) {
    let message = match reason {
        InvalidReason::NotFound => "Unknown recovery token",
        InvalidReason::Expired => "Recovery token has expired",
        InvalidReason::AlreadyConsumed => "Recovery token was already used",
    };
    failure(StatusCode::BAD_REQUEST, Some(reason.as_str()), message)
}

fn failure(
    status: StatusCode,
    reason: Option<&str>,
    message: &str,
) -> (StatusCode, Json<ResetResponse>) {
    (
        status,
        Json(ResetResponse {
            success: false,
            reason: reason.map(String::from),
            message: message.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use secrecy::ExposeSecret;
    use tokio::sync::Mutex;

    /// Records accepted updates; optionally refuses every call.
    #[derive(Default)]
    struct RecordingStore {
        refuse: bool,
        updates: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl CredentialStore for RecordingStore {
        async fn set_password(&self, principal: &str, new_secret: &SecretString) -> Result<()> {
            if self.refuse {
                bail!("credential store unavailable");
            }
            self.updates
                .lock()
                .await
                .push((principal.to_string(), new_secret.expose_secret().to_string()));
            Ok(())
        }
    }

    fn config() -> Arc<RecoveryConfig> {
        Arc::new(RecoveryConfig::new("https://portal.invalid".to_string()))
    }

    async fn call(
        tokens: Arc<TokenStore>,
        credentials: Arc<RecordingStore>,
        token: &str,
        new_secret: &str,
        confirm_secret: &str,
    ) -> (StatusCode, ResetResponse) {
        let (status, Json(body)) = reset(
            Extension(tokens),
            Extension(credentials as Arc<dyn CredentialStore>),
            Extension(config()),
            Some(Json(ResetRequest {
                token: token.to_string(),
                new_secret: new_secret.to_string(),
                confirm_secret: confirm_secret.to_string(),
            })),
        )
        .await;
        (status, body)
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_rejected() -> Result<()> {
        let tokens = Arc::new(TokenStore::default());
        let issued = tokens.issue("a@b.com").await?;
        let store = Arc::new(RecordingStore::default());

        let (status, body) = call(tokens, store, &issued, "long-enough-secret", "different").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.reason.as_deref(), Some("secrets_mismatch"));
        Ok(())
    }

    #[tokio::test]
    async fn weak_secret_is_rejected_before_token_work() -> Result<()> {
        let tokens = Arc::new(TokenStore::default());
        let issued = tokens.issue("a@b.com").await?;
        let store = Arc::new(RecordingStore::default());

        let (status, body) = call(Arc::clone(&tokens), store, &issued, "short", "short").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.reason.as_deref(), Some("weak_secret"));
        // Token must survive a rejected attempt.
        assert_eq!(tokens.validate(&issued).await, Ok(()));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_token_reports_not_found() {
        let tokens = Arc::new(TokenStore::default());
        let store = Arc::new(RecordingStore::default());

        let (status, body) = call(
            tokens,
            store,
            "nope",
            "long-enough-secret",
            "long-enough-secret",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.reason.as_deref(), Some("token_not_found"));
    }

    #[tokio::test]
    async fn successful_reset_updates_credentials_once() -> Result<()> {
        let tokens = Arc::new(TokenStore::default());
        let issued = tokens.issue("a@b.com").await?;
        let store = Arc::new(RecordingStore::default());

        let (status, body) = call(
            Arc::clone(&tokens),
            Arc::clone(&store),
            &issued,
            "long-enough-secret",
            "long-enough-secret",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);

        let updates = store.updates.lock().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "a@b.com");
        assert_eq!(updates[0].1, "long-enough-secret");
        Ok(())
    }

    #[tokio::test]
    async fn second_reset_with_same_token_is_already_used() -> Result<()> {
        let tokens = Arc::new(TokenStore::default());
        let issued = tokens.issue("a@b.com").await?;
        let store = Arc::new(RecordingStore::default());

        let (first_status, _) = call(
            Arc::clone(&tokens),
            Arc::clone(&store),
            &issued,
            "long-enough-secret",
            "long-enough-secret",
        )
        .await;
        assert_eq!(first_status, StatusCode::OK);

        let (second_status, body) = call(
            tokens,
            Arc::clone(&store),
            &issued,
            "another-long-secret",
            "another-long-secret",
        )
        .await;
        assert_eq!(second_status, StatusCode::BAD_REQUEST);
        assert_eq!(body.reason.as_deref(), Some("token_already_used"));
        assert_eq!(store.updates.lock().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn credential_store_failure_keeps_token_spent() -> Result<()> {
        let tokens = Arc::new(TokenStore::default());
        let issued = tokens.issue("a@b.com").await?;
        let store = Arc::new(RecordingStore {
            refuse: true,
            ..RecordingStore::default()
        });

        let (status, body) = call(
            Arc::clone(&tokens),
            store,
            &issued,
            "long-enough-secret",
            "long-enough-secret",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.success);
        assert_eq!(body.reason, None);
        assert_eq!(
            tokens.validate(&issued).await,
            Err(crate::tokens::InvalidReason::AlreadyConsumed)
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_token_is_rejected_up_front() {
        let tokens = Arc::new(TokenStore::default());
        let store = Arc::new(RecordingStore::default());

        let (status, body) = call(
            tokens,
            store,
            "  ",
            "long-enough-secret",
            "long-enough-secret",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.reason.as_deref(), Some("token_not_found"));
    }
}
