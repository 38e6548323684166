//! Application state for pourta-cloud

use std::sync::Arc;

use crate::config::Config;
use crate::db::{InMemoryOrderStore, OrderStore, PgOrderStore};
use crate::stripe::StripeClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Stripe REST client (one pooled HTTP client, configured timeout)
    pub stripe: StripeClient,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe publishable key for the storefront
    pub stripe_publishable_key: String,
    /// Maximum webhook timestamp age, in seconds
    pub webhook_tolerance_secs: i64,
    /// Order persistence
    pub orders: Arc<dyn OrderStore>,
}

impl AppState {
    /// Create a new AppState, connecting to PostgreSQL when configured
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let orders: Arc<dyn OrderStore> = match &config.database_url {
            Some(url) => {
                let store = PgOrderStore::connect(url).await?;
                tracing::info!("Order store: PostgreSQL");
                Arc::new(store)
            }
            None => {
                tracing::warn!(
                    "DATABASE_URL not set, paid orders are kept in memory and logged only"
                );
                Arc::new(InMemoryOrderStore::new())
            }
        };

        Self::with_store(config, orders)
    }

    /// Build state around an existing order store
    pub fn with_store(config: &Config, orders: Arc<dyn OrderStore>) -> Result<Self, BoxError> {
        let http = reqwest::Client::builder()
            .timeout(config.stripe_timeout)
            .build()?;

        Ok(Self {
            stripe: StripeClient::new(
                http,
                config.stripe_secret_key.clone(),
                config.stripe_api_base.clone(),
            ),
            stripe_webhook_secret: config.stripe_webhook_secret.clone(),
            stripe_publishable_key: config.stripe_publishable_key.clone(),
            webhook_tolerance_secs: config.webhook_tolerance_secs,
            orders,
        })
    }
}
