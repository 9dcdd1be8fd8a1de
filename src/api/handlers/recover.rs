//! Credential recovery request endpoint.
//!
//! The response contract is deliberately uniform: for any syntactically valid
//! email the caller gets the same generic success payload, whether or not the
//! principal exists and whether or not delivery worked. Malformed input is
//! the only caller-visible error branch. Delivery failures are logged with a
//! trace id for operators and, only when the server runs with diagnostics
//! exposed, echoed back in the response.

use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use super::state::RecoveryConfig;
use super::types::{RecoverDiagnostics, RecoverRequest, RecoverResponse};
use super::utils::{build_reset_link, normalize_email, valid_email};
use crate::delivery::{DeliveryGateway, Notification};
use crate::tokens::TokenStore;

/// Generic success text; must not vary with principal existence or delivery
/// outcome.
const RECOVERY_ACCEPTED: &str =
    "If the address is registered, a recovery link has been sent to it.";

const NOTIFICATION_SUBJECT: &str = "Password recovery";

/// Request a recovery link for a principal.
#[utoipa::path(
    post,
    path = "/recover",
    request_body = RecoverRequest,
    responses(
        (status = 200, description = "Recovery accepted", body = RecoverResponse),
        (status = 400, description = "Malformed request", body = RecoverResponse),
    ),
    tag = "recovery"
)]
#[instrument(skip(tokens, gateway, config, payload))]
pub async fn recover(
    tokens: Extension<Arc<TokenStore>>,
    gateway: Extension<Arc<DeliveryGateway>>,
    config: Extension<Arc<RecoveryConfig>>,
    payload: Option<Json<RecoverRequest>>,
) -> (StatusCode, Json<RecoverResponse>) {
    let request: RecoverRequest = match payload {
        Some(Json(payload)) => payload,
        None => return rejected("Missing payload"),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return rejected("Invalid email address");
    }

    // A token is issued for every well-formed address, registered or not;
    // only delivery can tell the difference and it never alters the response.
    let token = match tokens.issue(&email).await {
        Ok(token) => token,
        Err(err) => {
            error!("failed to issue recovery token: {err:#}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RecoverResponse {
                    success: false,
                    message: "Recovery is temporarily unavailable".to_string(),
                    diagnostics: None,
                }),
            );
        }
    };

    let link = build_reset_link(config.base_url(), &token);
    let notification = Notification {
        to_email: email.clone(),
        subject: NOTIFICATION_SUBJECT.to_string(),
        body: format!("Use the following link to reset your password: {link}"),
    };

    let report = gateway.send(&notification).await;

    let mut diagnostics = None;
    if report.delivered {
        debug!(
            endpoint = report.endpoint_used.as_deref().unwrap_or("none"),
            attempts = report.attempts,
            "recovery notification delivered"
        );
    } else {
        // Operator-facing record of the failed delivery; the caller still
        // receives the generic success payload below.
        let trace_id = Uuid::new_v4().to_string();
        error!(
            trace_id = %trace_id,
            principal = %email,
            link = %link,
            attempts = report.attempts,
            last_error = report.last_error.as_deref().unwrap_or("none"),
            "recovery notification could not be delivered"
        );
        if config.expose_diagnostics() {
            diagnostics = Some(RecoverDiagnostics {
                trace_id,
                principal: email,
                token,
                link,
                delivery_error: report.last_error,
            });
        }
    }

    (
        StatusCode::OK,
        Json(RecoverResponse {
            success: true,
            message: RECOVERY_ACCEPTED.to_string(),
            diagnostics,
        }),
    )
}

fn rejected(message: &str) -> (StatusCode, Json<RecoverResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(RecoverResponse {
            success: false,
            message: message.to_string(),
            diagnostics: None,
        }),
    )
}
