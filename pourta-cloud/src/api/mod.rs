//! API routes for pourta-cloud

pub mod checkout;
pub mod health;
pub mod session_status;
pub mod stripe_config;
pub mod stripe_webhook;

use axum::Router;
use axum::http::{HeaderName, Method, header::CONTENT_TYPE};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the public router
pub fn create_router(state: AppState) -> Router {
    // The storefront is served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static("stripe-signature"),
            HeaderName::from_static("idempotency-key"),
        ]);

    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/create-checkout-session",
            post(checkout::create_checkout_session),
        )
        .route("/api/session-status", get(session_status::session_status))
        .route("/api/stripe/config", get(stripe_config::stripe_config))
        // Signature-verified, raw body
        .route("/api/stripe-webhook", post(stripe_webhook::handle_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::test_app;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cors_preflight() {
        let (app, _) = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/create-checkout-session")
                    .header("origin", "https://shop.example")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (app, _) = test_app();
        let resp = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
