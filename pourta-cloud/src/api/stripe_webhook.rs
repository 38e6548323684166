//! Stripe webhook handler
//!
//! POST /api/stripe-webhook: handles Stripe events (raw body for signature verification)

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::Value;

use shared::error::{AppError, ErrorCode};

use crate::db::PaidOrder;
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;
use crate::stripe;

/// Handle incoming Stripe webhook events
///
/// Must receive raw body (not JSON) for HMAC signature verification.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ServiceResult<Json<Value>> {
    // 1. Get Stripe-Signature header
    let sig_header = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Stripe-Signature header");
            AppError::with_message(
                ErrorCode::WebhookSignatureInvalid,
                "Webhook Error: missing Stripe-Signature header",
            )
        })?;

    // 2. Verify signature against the raw bytes
    stripe::verify_webhook_signature(
        &body,
        sig_header,
        &state.stripe_webhook_secret,
        state.webhook_tolerance_secs,
        shared::util::now_secs(),
    )
    .map_err(|e| {
        tracing::warn!(error = e, "Webhook signature verification failed");
        AppError::with_message(
            ErrorCode::WebhookSignatureInvalid,
            format!("Webhook Error: {e}"),
        )
    })?;

    // 3. Parse JSON event
    let event: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(%e, "Failed to parse webhook JSON");
        AppError::new(ErrorCode::WebhookPayloadInvalid)
    })?;

    let event_type = event["type"].as_str().unwrap_or("");
    let event_id = event["id"].as_str().ok_or_else(|| {
        tracing::warn!("Webhook event missing id");
        AppError::with_message(ErrorCode::WebhookPayloadInvalid, "Webhook event missing id")
    })?;
    tracing::info!(event_id, event_type, "Received Stripe webhook");

    // 4. Idempotency: record first, skip if already seen
    let now = shared::util::now_millis();
    if !state.orders.record_event(event_id, event_type, now).await? {
        tracing::info!(event_id, "Duplicate webhook event, skipping");
        return Ok(received());
    }

    // 5. Handle event types
    let object = &event["data"]["object"];
    let outcome = match event_type {
        "checkout.session.completed" => handle_checkout_completed(&state, object, now).await,
        "payment_intent.succeeded" => {
            tracing::info!(payment_intent = object["id"].as_str(), "Payment succeeded");
            Ok(())
        }
        "payment_intent.payment_failed" => {
            handle_payment_failed(&state, object, now).await;
            Ok(())
        }
        _ => {
            tracing::debug!(event_type, "Unhandled webhook event type");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        // Let Stripe's retry through the dedup check
        if let Err(release_err) = state.orders.release_event(event_id).await {
            tracing::error!(%release_err, event_id, "Failed to release webhook event");
        }
        return Err(e);
    }

    Ok(received())
}

fn received() -> Json<Value> {
    Json(serde_json::json!({ "received": true }))
}

/// checkout.session.completed → mark the order paid
async fn handle_checkout_completed(
    state: &AppState,
    session: &Value,
    now: i64,
) -> Result<(), ServiceError> {
    let Some(session_id) = session["id"].as_str() else {
        tracing::warn!("checkout.session.completed missing session id");
        return Ok(());
    };

    let order = paid_order_from_session(session_id, session, now);
    state.orders.mark_paid(&order).await?;

    tracing::info!(
        session_id,
        customer_email = order.customer_email.as_deref().unwrap_or(""),
        amount_total = order.amount_total,
        "Order marked paid"
    );
    Ok(())
}

fn paid_order_from_session(session_id: &str, session: &Value, now: i64) -> PaidOrder {
    let customer = &session["customer_details"];
    // Older API versions put shipping at the top level
    let shipping = session["shipping_details"]["address"]
        .as_object()
        .or_else(|| session["collected_information"]["shipping_details"]["address"].as_object())
        .map(|address| Value::Object(address.clone()));

    PaidOrder {
        stripe_session_id: session_id.to_string(),
        order_ref: session["metadata"][stripe::ORDER_REF_KEY]
            .as_str()
            .map(String::from),
        amount_total: session["amount_total"].as_i64(),
        currency: session["currency"].as_str().map(String::from),
        customer_email: customer["email"].as_str().map(String::from),
        customer_phone: customer["phone"].as_str().map(String::from),
        shipping_address: shipping,
        billing_address: customer["address"]
            .as_object()
            .map(|address| Value::Object(address.clone())),
        metadata: session["metadata"].clone(),
        updated_at: now,
    }
}

/// payment_intent.payment_failed → mark the order named by the intent's
/// `order_ref` metadata failed
///
/// Failures here are logged only; the event is still acknowledged.
async fn handle_payment_failed(state: &AppState, intent: &Value, now: i64) {
    let intent_id = intent["id"].as_str().unwrap_or("");
    tracing::info!(payment_intent = intent_id, "Payment failed");

    let Some(order_ref) = intent["metadata"][stripe::ORDER_REF_KEY].as_str() else {
        tracing::debug!(payment_intent = intent_id, "Failed payment has no order_ref metadata");
        return;
    };

    match state.orders.mark_failed(order_ref, now).await {
        Ok(true) => tracing::info!(order_ref, "Order marked failed"),
        Ok(false) => tracing::debug!(order_ref, "No unpaid order for failed payment"),
        Err(e) => tracing::error!(%e, order_ref, "Failed to mark order failed"),
    }
}
