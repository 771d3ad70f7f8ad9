use std::path::Path;

/// Server configuration
///
/// # Environment variables
///
/// Every setting can be overridden through the environment (a `.env` file is
/// loaded first by `main`):
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/lab-registry | Working directory |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | DATABASE_PATH | {WORK_DIR}/registry.db | SQLite database file |
/// | UPLOAD_DIR | {WORK_DIR}/uploads | Root of stored photos and documents |
/// | MAX_UPLOAD_BYTES | 5242880 | Maximum size of one uploaded file |
/// | DB_MAX_CONNECTIONS | 5 | Pool size |
/// | DB_BUSY_TIMEOUT_MS | 5000 | Wait for the SQLite writer lock |
/// | DB_ACQUIRE_TIMEOUT_MS | 10000 | Wait for a pooled connection |
/// | NOTIFY_WEBHOOK_URL | (unset) | Chat webhook for notifications |
/// | LOG_LEVEL | info | Fallback when RUST_LOG is unset |
/// | LOG_DIR | (unset) | Daily rolling log files |
/// | LOG_JSON | false | JSON log lines |
/// | ENVIRONMENT | development | development, staging or production |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/lab HTTP_PORT=8080 cargo run -p lab-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and uploads
    pub work_dir: String,
    pub http_port: u16,
    pub database_path: String,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub db_max_connections: u32,
    pub db_busy_timeout_ms: u64,
    pub db_acquire_timeout_ms: u64,
    /// Notifications are only logged when unset
    pub notify_webhook_url: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/lab-registry".into());
        let mut config = Self::with_work_dir(work_dir);

        config.http_port = env_parse("HTTP_PORT").unwrap_or(3000);
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = path;
        }
        if let Ok(dir) = std::env::var("UPLOAD_DIR") {
            config.upload_dir = dir;
        }
        config.max_upload_bytes = env_parse("MAX_UPLOAD_BYTES").unwrap_or(config.max_upload_bytes);
        config.db_max_connections =
            env_parse("DB_MAX_CONNECTIONS").unwrap_or(config.db_max_connections);
        config.db_busy_timeout_ms =
            env_parse("DB_BUSY_TIMEOUT_MS").unwrap_or(config.db_busy_timeout_ms);
        config.db_acquire_timeout_ms =
            env_parse("DB_ACQUIRE_TIMEOUT_MS").unwrap_or(config.db_acquire_timeout_ms);
        config.notify_webhook_url = std::env::var("NOTIFY_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        config.log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
        config.log_dir = std::env::var("LOG_DIR").ok();
        config.log_json = env_parse("LOG_JSON").unwrap_or(false);
        config.environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        config
    }

    /// Defaults rooted at `work_dir`, ignoring the environment
    ///
    /// Used by tests to get an isolated database and upload directory.
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let work_dir = work_dir.into();
        let root = Path::new(&work_dir);
        Self {
            database_path: root.join("registry.db").to_string_lossy().into_owned(),
            upload_dir: root.join("uploads").to_string_lossy().into_owned(),
            work_dir,
            http_port: 3000,
            max_upload_bytes: 5 * 1024 * 1024,
            db_max_connections: 5,
            db_busy_timeout_ms: 5000,
            db_acquire_timeout_ms: 10_000,
            notify_webhook_url: None,
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
            environment: "development".into(),
        }
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

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
