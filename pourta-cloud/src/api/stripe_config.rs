//! Publishable key for the storefront
//!
//! GET /api/stripe/config

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn stripe_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "publishableKey": state.stripe_publishable_key,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{json_body, test_app};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_returns_publishable_key_only() {
        let (app, _) = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/stripe/config")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body, serde_json::json!({ "publishableKey": "pk_test_123" }));
    }
}
