use crate::api::GIT_COMMIT_HASH;
use axum::{
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// Service liveness probe with build identification.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", content_type = "application/json")
    ),
    tag = "health"
)]
pub async fn health() -> impl IntoResponse {
    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build": GIT_COMMIT_HASH,
    }));

    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )
    .parse()
    {
        headers.insert("X-App", value);
    }

    (headers, body)
}

#[cfg(test)]
mod tests {
    use super::health;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn health_reports_package_name() {
        let response = health().await.into_response();
        assert!(response.headers().contains_key("X-App"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await;
        let parsed: Option<serde_json::Value> = bytes
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok());
        assert_eq!(
            parsed.and_then(|value| value["name"].as_str().map(String::from)),
            Some(env!("CARGO_PKG_NAME").to_string())
        );
    }
}
