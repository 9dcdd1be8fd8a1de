//! Request/response types for the recovery endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RecoverRequest {
    pub email: String,
}

/// Operator-facing detail attached to `/recover` responses only when the
/// server runs with diagnostics exposed (non-production posture).
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RecoverDiagnostics {
    pub trace_id: String,
    pub principal: String,
    pub token: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_error: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RecoverResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<RecoverDiagnostics>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetRequest {
    pub token: String,
    pub new_secret: String,
    pub confirm_secret: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetResponse {
    pub success: bool,
    /// Machine-readable failure code, e.g. `token_expired` or `weak_secret`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub message: String,
}
