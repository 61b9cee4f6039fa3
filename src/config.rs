use std::time::Duration;

/// Runtime settings for the workflow engine.
///
/// Every call that leaves the process (directory lookups, the payment gateway)
/// and every per-record lock wait is bounded by one of these timeouts.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for a single external call.
    pub upstream_timeout: Duration,
    /// Upper bound for waiting on a per-record lock.
    pub lock_timeout: Duration,
    /// Shared secret used to verify payment callback signatures.
    pub webhook_secret: String,
    /// Origin of the hosted checkout pages handed out as payment URLs.
    pub checkout_base_url: String,
    /// Currency applied to rooms that do not carry one.
    pub default_currency: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_secs(10),
            lock_timeout: Duration::from_secs(5),
            webhook_secret: String::new(),
            checkout_base_url: "https://checkout.local".to_string(),
            default_currency: "INR".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = secret.into();
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_checkout_base_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_base_url = url.into();
        self
    }
}
