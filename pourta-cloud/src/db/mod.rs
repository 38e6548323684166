//! Order persistence
//!
//! Handlers talk to an [`OrderStore`]. With a database configured that is
//! [`PgOrderStore`]; without one, [`InMemoryOrderStore`] keeps orders for
//! the life of the process and logs each paid order for fulfilment.

pub mod orders;

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

impl OrderStatus {
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

/// An order whose checkout session was just created
#[derive(Debug, Clone)]
pub struct PendingOrder {
    pub stripe_session_id: String,
    /// Reference also stamped on the PaymentIntent's metadata
    pub order_ref: String,
    pub total_cents: i64,
    pub metadata: serde_json::Value,
    pub created_at: i64,
}

/// Payment details taken from a completed checkout session
#[derive(Debug, Clone, Default)]
pub struct PaidOrder {
    pub stripe_session_id: String,
    pub order_ref: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub shipping_address: Option<serde_json::Value>,
    pub billing_address: Option<serde_json::Value>,
    pub metadata: serde_json::Value,
    pub updated_at: i64,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Record a webhook event id; `false` when it was already processed
    async fn record_event(&self, event_id: &str, event_type: &str, now: i64)
    -> Result<bool, BoxError>;

    /// Forget an event id so the processor's retry is handled again
    async fn release_event(&self, event_id: &str) -> Result<(), BoxError>;

    async fn create_pending(&self, order: &PendingOrder) -> Result<(), BoxError>;

    async fn mark_paid(&self, order: &PaidOrder) -> Result<(), BoxError>;

    /// Mark the order carrying `order_ref` failed; `false` when no unpaid order matched
    async fn mark_failed(&self, order_ref: &str, now: i64) -> Result<bool, BoxError>;
}

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub async fn connect(database_url: &str) -> Result<Self, BoxError> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn record_event(
        &self,
        event_id: &str,
        event_type: &str,
        now: i64,
    ) -> Result<bool, BoxError> {
        Ok(orders::record_event(&self.pool, event_id, event_type, now).await?)
    }

    async fn release_event(&self, event_id: &str) -> Result<(), BoxError> {
        Ok(orders::release_event(&self.pool, event_id).await?)
    }

    async fn create_pending(&self, order: &PendingOrder) -> Result<(), BoxError> {
        Ok(orders::create_pending(&self.pool, order).await?)
    }

    async fn mark_paid(&self, order: &PaidOrder) -> Result<(), BoxError> {
        Ok(orders::mark_paid(&self.pool, order).await?)
    }

    async fn mark_failed(&self, order_ref: &str, now: i64) -> Result<bool, BoxError> {
        Ok(orders::mark_failed(&self.pool, order_ref, now).await?)
    }
}

/// Snapshot of an order held by [`InMemoryOrderStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub status: OrderStatus,
    pub order_ref: Option<String>,
    pub total_cents: Option<i64>,
    pub customer_email: Option<String>,
}

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<String, OrderRecord>,
    events: DashMap<String, String>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn get(&self, stripe_session_id: &str) -> Option<OrderRecord> {
        self.orders.get(stripe_session_id).map(|r| r.value().clone())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn record_event(
        &self,
        event_id: &str,
        event_type: &str,
        _now: i64,
    ) -> Result<bool, BoxError> {
        Ok(self
            .events
            .insert(event_id.to_string(), event_type.to_string())
            .is_none())
    }

    async fn release_event(&self, event_id: &str) -> Result<(), BoxError> {
        self.events.remove(event_id);
        Ok(())
    }

    async fn create_pending(&self, order: &PendingOrder) -> Result<(), BoxError> {
        self.orders
            .entry(order.stripe_session_id.clone())
            .or_insert_with(|| OrderRecord {
                status: OrderStatus::Pending,
                order_ref: Some(order.order_ref.clone()),
                total_cents: Some(order.total_cents),
                customer_email: None,
            });
        Ok(())
    }

    async fn mark_paid(&self, order: &PaidOrder) -> Result<(), BoxError> {
        let mut record = self
            .orders
            .entry(order.stripe_session_id.clone())
            .or_insert_with(|| OrderRecord {
                status: OrderStatus::Pending,
                order_ref: None,
                total_cents: None,
                customer_email: None,
            });
        record.status = OrderStatus::Paid;
        record.order_ref = order.order_ref.clone().or(record.order_ref.take());
        record.total_cents = order.amount_total.or(record.total_cents);
        record.customer_email = order.customer_email.clone();

        tracing::info!(
            session_id = %order.stripe_session_id,
            order_ref = record.order_ref.as_deref().unwrap_or(""),
            customer_email = record.customer_email.as_deref().unwrap_or(""),
            total_cents = record.total_cents,
            currency = order.currency.as_deref().unwrap_or(""),
            shipping_address = %order.shipping_address.clone().unwrap_or_default(),
            metadata = %order.metadata,
            "Order paid, ready for fulfilment"
        );
        Ok(())
    }

    async fn mark_failed(&self, order_ref: &str, _now: i64) -> Result<bool, BoxError> {
        let Some(mut record) = self
            .orders
            .iter_mut()
            .find(|r| r.order_ref.as_deref() == Some(order_ref))
        else {
            return Ok(false);
        };
        if record.status == OrderStatus::Paid {
            return Ok(false);
        }
        record.status = OrderStatus::Failed;
        Ok(true)
    }
}
