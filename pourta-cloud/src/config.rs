//! Cloud checkout service configuration

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Cloud checkout service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// PostgreSQL connection URL; paid orders are only logged when unset
    pub database_url: Option<String>,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe publishable key, handed to the storefront
    pub stripe_publishable_key: String,
    /// Stripe REST base URL (overridable for tests and proxies)
    pub stripe_api_base: String,
    /// Timeout for each Stripe call
    pub stripe_timeout: Duration,
    /// Maximum age of a webhook signature timestamp, in seconds
    pub webhook_tolerance_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| {
            optional(name).ok_or_else(|| -> BoxError {
                format!("{name} must be set to a non-empty value").into()
            })
        };

        let stripe_timeout_secs: u64 =
            parse_or(optional("STRIPE_TIMEOUT_SECS"), 15, "STRIPE_TIMEOUT_SECS")?;

        Ok(Self {
            http_port: parse_or(optional("HTTP_PORT"), 8080, "HTTP_PORT")?,
            environment: optional("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            database_url: optional("DATABASE_URL"),
            stripe_secret_key: require("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: require("STRIPE_WEBHOOK_SECRET")?,
            stripe_publishable_key: require("STRIPE_PUBLISHABLE_KEY")?,
            stripe_api_base: optional("STRIPE_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.into()),
            stripe_timeout: Duration::from_secs(stripe_timeout_secs),
            webhook_tolerance_secs: parse_or(
                optional("WEBHOOK_TOLERANCE_SECS"),
                300,
                "WEBHOOK_TOLERANCE_SECS",
            )?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    default: T,
    name: &str,
) -> Result<T, BoxError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {raw}").into()),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("STRIPE_SECRET_KEY", "sk_test_123"),
        ("STRIPE_WEBHOOK_SECRET", "whsec_123"),
        ("STRIPE_PUBLISHABLE_KEY", "pk_test_123"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.environment, "development");
        assert!(config.database_url.is_none());
        assert_eq!(config.stripe_api_base, "https://api.stripe.com");
        assert_eq!(config.stripe_timeout, Duration::from_secs(15));
        assert_eq!(config.webhook_tolerance_secs, 300);
    }

    #[test]
    fn test_missing_secret_names_variable() {
        for missing in ["STRIPE_SECRET_KEY", "STRIPE_WEBHOOK_SECRET", "STRIPE_PUBLISHABLE_KEY"] {
            let vars: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();
            let err = Config::from_lookup(lookup(&vars)).unwrap_err();
            assert!(err.to_string().contains(missing), "{err}");
        }
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let mut vars = REQUIRED.to_vec();
        vars[0] = ("STRIPE_SECRET_KEY", "  ");
        assert!(Config::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("HTTP_PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/pourta"),
            ("STRIPE_API_BASE", "http://127.0.0.1:12111/"),
            ("STRIPE_TIMEOUT_SECS", "3"),
            ("WEBHOOK_TOLERANCE_SECS", "60"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/pourta"));
        assert_eq!(config.stripe_api_base, "http://127.0.0.1:12111");
        assert_eq!(config.stripe_timeout, Duration::from_secs(3));
        assert_eq!(config.webhook_tolerance_secs, 60);
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HTTP_PORT", "eighty"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("HTTP_PORT"));
    }
}
