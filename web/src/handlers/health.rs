//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use axum::Json;
use serde::{Deserialize, Serialize};

/// Liveness response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Readiness response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service accepts traffic
    pub ready: bool,
}

/// Simple health check endpoint (for basic liveness).
///
/// Does not reach the payment gateway.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness endpoint.
///
/// All state is in memory, so the service is ready as soon as it listens.
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
#[allow(clippy::unused_async)]
pub async fn readiness_check() -> Json<ReadinessResponse> {
    Json(ReadinessResponse { ready: true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_readiness_check() {
        let Json(body) = readiness_check().await;
        assert!(body.ready);
    }
}
