//! HTTP surface of the scaffold.
//!
//! This is intentionally a thin layer: one route, one state struct. Handlers
//! translate HTTP concerns (status codes, JSON bodies) into plain values and
//! back; anything with behaviour lives in its own module.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

pub mod health;

/// State shared by request handlers.
///
/// Built once at startup from the loaded config and passed into
/// [`router`] explicitly — no globals.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Identifier reported in every health response.
    pub service_name: String,
}

/// Build the axum router for the status endpoint.
///
/// CORS is wide open on purpose: the frontend runs on a different origin
/// (its dev server), and the browser would otherwise block the probe.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::AppState;

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = super::router(Arc::new(AppState {
            service_name: "epcr-api".into(),
        }));
        let req = Request::builder()
            .method("GET")
            .uri("/narratives")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
