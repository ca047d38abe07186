//! Status endpoint (`GET /health`).
//!
//! The one window the frontend has into backend liveness. The handler has no
//! failure path and no side effects — it only reports.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AppState;

/// The liveness report returned by `GET /health`.
///
/// Constructed fresh inside each handler invocation and discarded after
/// serialization — nothing here is shared or cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `true` — the handler cannot observe an unhealthy state of
    /// itself; an unreachable server simply never answers.
    pub ok: bool,
    /// Which service is responding. Useful once multiple backends exist.
    pub service: String,
    /// Wall-clock time at the moment of handling, ISO-8601 with milliseconds.
    /// Regenerated per request so the caller can tell a live response from a
    /// cached one.
    pub time: String,
}

/// `GET /health` — always 200 OK with a fresh [`HealthStatus`].
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        ok: true,
        service: state.service_name.clone(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt; // oneshot

    use super::HealthStatus;
    use crate::api::AppState;

    fn app() -> axum::Router {
        crate::api::router(Arc::new(AppState {
            service_name: "epcr-api".into(),
        }))
    }

    async fn get_health(app: axum::Router) -> (StatusCode, HealthStatus) {
        let req = Request::builder()
            .method("GET")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // -----------------------------------------------------------------------
    // Response shape
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_returns_200_with_ok_true_and_service_name() {
        let (status, body) = get_health(app()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.ok);
        assert_eq!(body.service, "epcr-api");
    }

    #[tokio::test]
    async fn health_service_field_follows_configured_name() {
        let app = crate::api::router(Arc::new(AppState {
            service_name: "epcr-staging".into(),
        }));
        let (_, body) = get_health(app).await;
        assert_eq!(body.service, "epcr-staging");
    }

    #[tokio::test]
    async fn health_time_is_a_parseable_iso8601_timestamp() {
        let (_, body) = get_health(app()).await;
        let parsed = chrono::DateTime::parse_from_rfc3339(&body.time);
        assert!(parsed.is_ok(), "time not ISO-8601: {}", body.time);
        assert!(body.time.ends_with('Z'), "time should be UTC: {}", body.time);
    }

    #[tokio::test]
    async fn sequential_health_calls_yield_non_decreasing_timestamps() {
        let (_, first) = get_health(app()).await;
        let (_, second) = get_health(app()).await;
        let t1 = chrono::DateTime::parse_from_rfc3339(&first.time).unwrap();
        let t2 = chrono::DateTime::parse_from_rfc3339(&second.time).unwrap();
        assert!(t2 >= t1, "timestamps went backwards: {t1} then {t2}");
    }

    // -----------------------------------------------------------------------
    // CORS
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_permits_cross_origin_requests() {
        let req = Request::builder()
            .method("GET")
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let allow = resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("missing Access-Control-Allow-Origin");
        assert_eq!(allow, "*");
    }
}
