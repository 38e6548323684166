use sqlx::PgPool;

use super::{OrderStatus, PaidOrder, PendingOrder};

pub async fn create_pending(pool: &PgPool, order: &PendingOrder) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (stripe_session_id, order_ref, status, total_cents, metadata,
            created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         ON CONFLICT (stripe_session_id) DO NOTHING",
    )
    .bind(&order.stripe_session_id)
    .bind(&order.order_ref)
    .bind(OrderStatus::Pending.as_db())
    .bind(order.total_cents)
    .bind(&order.metadata)
    .bind(order.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Upsert: the completion event may arrive for a session this service never saw
pub async fn mark_paid(pool: &PgPool, order: &PaidOrder) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (stripe_session_id, order_ref, status, total_cents, currency,
            customer_email, customer_phone, shipping_address, billing_address, metadata,
            created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
         ON CONFLICT (stripe_session_id) DO UPDATE SET
            order_ref = COALESCE(EXCLUDED.order_ref, orders.order_ref),
            status = EXCLUDED.status,
            total_cents = COALESCE(EXCLUDED.total_cents, orders.total_cents),
            currency = COALESCE(EXCLUDED.currency, orders.currency),
            customer_email = EXCLUDED.customer_email,
            customer_phone = EXCLUDED.customer_phone,
            shipping_address = EXCLUDED.shipping_address,
            billing_address = EXCLUDED.billing_address,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(&order.stripe_session_id)
    .bind(&order.order_ref)
    .bind(OrderStatus::Paid.as_db())
    .bind(order.amount_total)
    .bind(&order.currency)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(&order.shipping_address)
    .bind(&order.billing_address)
    .bind(&order.metadata)
    .bind(order.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Paid orders are never downgraded
pub async fn mark_failed(pool: &PgPool, order_ref: &str, now: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET status = $1, updated_at = $2
         WHERE order_ref = $3 AND status <> $4",
    )
    .bind(OrderStatus::Failed.as_db())
    .bind(now)
    .bind(order_ref)
    .bind(OrderStatus::Paid.as_db())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// INSERT first and check rows_affected, so concurrent deliveries race on the key
pub async fn record_event(
    pool: &PgPool,
    event_id: &str,
    event_type: &str,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO processed_webhook_events (event_id, event_type, processed_at)
         VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
    )
    .bind(event_id)
    .bind(event_type)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn release_event(pool: &PgPool, event_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM processed_webhook_events WHERE event_id = $1")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}
