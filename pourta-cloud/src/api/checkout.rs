//! Checkout session creation
//!
//! POST /api/create-checkout-session

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;

use shared::checkout::{CreateSessionRequest, CreateSessionResponse};
use shared::error::AppError;

use crate::db::PendingOrder;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::stripe;

const IDEMPOTENCY_HEADER: &str = "idempotency-key";
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// Validate the cart payload and open a Stripe Checkout Session
///
/// Nothing is sent to Stripe unless the payload validates.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ServiceResult<Json<CreateSessionResponse>> {
    let Json(request) = payload.map_err(|e| AppError::invalid_request(e.body_text()))?;
    request.validate()?;

    let idempotency_key = match client_idempotency_key(&headers)? {
        Some(key) => key,
        None => stripe::new_idempotency_key(),
    };

    // The idempotency key doubles as the order reference, so a retry keeps both
    let order_ref = idempotency_key;
    let session = state
        .stripe
        .create_checkout_session(&request, &order_ref, &order_ref)
        .await?;

    tracing::info!(
        session_id = %session.id,
        items = request.items.len(),
        "Checkout session created"
    );

    let pending = PendingOrder {
        stripe_session_id: session.id.clone(),
        order_ref,
        total_cents: request
            .items
            .iter()
            .map(|item| item.unit_amount.saturating_mul(i64::from(item.quantity)))
            .fold(0, i64::saturating_add),
        metadata: serde_json::to_value(&request.metadata).unwrap_or_default(),
        created_at: shared::util::now_millis(),
    };
    // The session already exists; a lost pending row is recovered by the webhook upsert
    if let Err(e) = state.orders.create_pending(&pending).await {
        tracing::error!(%e, session_id = %session.id, "Failed to record pending order");
    }

    Ok(Json(CreateSessionResponse { id: session.id }))
}

fn client_idempotency_key(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(IDEMPOTENCY_HEADER) else {
        return Ok(None);
    };

    let key = value
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|k| !k.is_empty() && k.len() <= MAX_IDEMPOTENCY_KEY_LEN)
        .ok_or_else(|| {
            AppError::invalid_request(format!(
                "Idempotency-Key must be 1 to {MAX_IDEMPOTENCY_KEY_LEN} visible ASCII characters"
            ))
        })?;

    Ok(Some(key.to_string()))
}
