/// Server configuration
///
/// # Environment variables
///
/// All settings can be overridden through environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/market | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | CHECKOUT_DEADLINE_MS | 20000 | Checkout transaction deadline |
/// | TXN_RETRY_LIMIT | 3 | Checkout attempts before a conflict surfaces |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/market HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Deadline for one checkout write transaction (milliseconds)
    pub checkout_deadline_ms: u64,
    /// Attempts per checkout before a transaction conflict surfaces
    pub txn_retry_limit: u32,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/market".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            checkout_deadline_ms: std::env::var("CHECKOUT_DEADLINE_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(20_000),
            txn_retry_limit: std::env::var("TXN_RETRY_LIMIT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3),
        }
    }

    /// Override the parts tests commonly need
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn checkout_deadline(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.checkout_deadline_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
