//! Stripe integration via REST API (no SDK dependency)

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use shared::checkout::CreateSessionRequest;
use shared::error::{AppError, AppResult, ErrorCode};

const CURRENCY: &str = "usd";
const SHIPPING_COUNTRIES: [&str; 2] = ["US", "CA"];

/// Metadata key linking a session and its PaymentIntent to our order
pub const ORDER_REF_KEY: &str = "order_ref";

/// The parts of a Checkout Session this service reads back
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
}

/// Thin client over the Checkout Sessions endpoints
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(http: reqwest::Client, secret_key: String, api_base: String) -> Self {
        Self {
            http,
            secret_key,
            api_base,
        }
    }

    /// Create a Checkout Session (payment mode)
    ///
    /// `idempotency_key` makes a retried submission return the same session.
    pub async fn create_checkout_session(
        &self,
        request: &CreateSessionRequest,
        order_ref: &str,
        idempotency_key: &str,
    ) -> AppResult<CheckoutSession> {
        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .header("Idempotency-Key", idempotency_key)
            .form(&checkout_form(request, order_ref))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_body(resp).await?;
        serde_json::from_value(body).map_err(|e| {
            tracing::error!(%e, "Unexpected Checkout Session shape");
            AppError::payment_provider("Stripe returned an unexpected session")
        })
    }

    /// Retrieve a Checkout Session with its PaymentIntent expanded
    pub async fn retrieve_session(&self, session_id: &str) -> AppResult<serde_json::Value> {
        if !is_valid_object_id(session_id) {
            return Err(AppError::invalid_request("Malformed session id")
                .with_detail("session_id", session_id.to_string()));
        }

        let resp = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{session_id}",
                self.api_base
            ))
            .basic_auth(&self.secret_key, None::<&str>)
            .query(&[("expand[]", "payment_intent")])
            .send()
            .await
            .map_err(transport_error)?;

        read_body(resp).await
    }
}

/// Form body for `POST /v1/checkout/sessions`
///
/// `order_ref` goes on both the session and its PaymentIntent, so payment
/// events that only carry the intent can still find the order.
pub fn checkout_form(request: &CreateSessionRequest, order_ref: &str) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = Vec::new();
    let mut push = |key: String, value: String| form.push((key, value));

    push("mode".into(), "payment".into());
    push("payment_method_types[0]".into(), "card".into());

    for (i, item) in request.items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        push(
            format!("{prefix}[price_data][currency]"),
            CURRENCY.into(),
        );
        push(
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        );
        if let Some(description) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
            push(
                format!("{prefix}[price_data][product_data][description]"),
                description.to_string(),
            );
        }
        push(
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        );
        push(format!("{prefix}[quantity]"), item.quantity.to_string());
    }

    push("success_url".into(), request.success_url_with_session());
    push("cancel_url".into(), request.cancel_url.clone());
    push("billing_address_collection".into(), "required".into());
    for (i, country) in SHIPPING_COUNTRIES.iter().enumerate() {
        push(
            format!("shipping_address_collection[allowed_countries][{i}]"),
            (*country).into(),
        );
    }
    push("phone_number_collection[enabled]".into(), "true".into());
    push("customer_creation".into(), "always".into());
    push("allow_promotion_codes".into(), "true".into());

    let rate = "shipping_options[0][shipping_rate_data]";
    push(format!("{rate}[type]"), "fixed_amount".into());
    push(format!("{rate}[fixed_amount][amount]"), "0".into());
    push(format!("{rate}[fixed_amount][currency]"), CURRENCY.into());
    push(format!("{rate}[display_name]"), "Free Shipping".into());
    push(
        format!("{rate}[delivery_estimate][minimum][unit]"),
        "business_day".into(),
    );
    push(format!("{rate}[delivery_estimate][minimum][value]"), "5".into());
    push(
        format!("{rate}[delivery_estimate][maximum][unit]"),
        "business_day".into(),
    );
    push(format!("{rate}[delivery_estimate][maximum][value]"), "10".into());

    if let Some(metadata) = &request.metadata {
        for (key, value) in metadata.iter().filter(|(k, _)| k.as_str() != ORDER_REF_KEY) {
            push(format!("metadata[{key}]"), value.clone());
        }
    }
    push(format!("metadata[{ORDER_REF_KEY}]"), order_ref.into());
    push(
        format!("payment_intent_data[metadata][{ORDER_REF_KEY}]"),
        order_ref.into(),
    );

    form
}

/// Fresh idempotency key for a submission that did not bring its own
///
/// Unique per submission; a client that retries sends its own key.
pub fn new_idempotency_key() -> String {
    format!("checkout-{}", uuid::Uuid::new_v4().simple())
}

/// Stripe object ids are ASCII alphanumerics and underscores
fn is_valid_object_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 255
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        tracing::warn!(%e, "Stripe request timed out");
        AppError::with_message(ErrorCode::TimeoutError, "Payment processor timed out")
    } else {
        tracing::warn!(%e, "Stripe request failed");
        AppError::with_message(ErrorCode::NetworkError, "Could not reach payment processor")
    }
}

async fn read_body(resp: reqwest::Response) -> AppResult<serde_json::Value> {
    let status = resp.status();
    let body: serde_json::Value = resp.json().await.map_err(|e| {
        if e.is_decode() {
            AppError::payment_provider("Stripe returned a malformed response")
        } else {
            transport_error(e)
        }
    })?;

    if !status.is_success() {
        let message = body["error"]["message"]
            .as_str()
            .unwrap_or("Stripe request failed");
        tracing::warn!(
            status = status.as_u16(),
            stripe_error = message,
            "Stripe rejected request"
        );
        return Err(AppError::payment_provider(message).with_detail("status", status.as_u16()));
    }

    Ok(body)
}

/// Verify Stripe webhook signature (HMAC-SHA256)
///
/// `payload` must be the raw request body. The header may carry several
/// `v1` signatures during secret rotation; any one matching is enough.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err("Invalid Stripe-Signature header");
    }

    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    // Constant-time comparison via hmac::verify_slice
    let matched = signatures.iter().any(|signature| {
        hex::decode(signature)
            .map(|sig_bytes| mac.clone().verify_slice(&sig_bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err("Webhook signature mismatch");
    }

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    if (now - ts).abs() > tolerance_secs {
        return Err("Webhook timestamp outside tolerance");
    }

    Ok(())
}

/// Build a `Stripe-Signature` header the way the processor does
#[cfg(test)]
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    )
}
