//! Client configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | DOCERIA_API_URL | https://doceria-crm-backend.onrender.com/api | REST backend base URL |
//! | REQUEST_TIMEOUT_SECS | 30 | HTTP request timeout |
//! | POLL_INTERVAL_SECS | 30 | Snapshot refresh interval |
//! | ALARM_PULSE_MS | 1000 | New-order alarm pulse period |
//! | BUSINESS_TZ | America/Sao_Paulo | Timezone for dashboard day/week boundaries |
//! | AUTH_API_URL | https://identitytoolkit.googleapis.com/v1 | Identity provider |
//! | AUTH_API_KEY | (empty) | Identity provider API key |
//! | STORAGE_API_URL | https://firebasestorage.googleapis.com | Object storage |
//! | STORAGE_BUCKET | crmdoceria-9959e.firebasestorage.app | Bucket for product images |
//! | GEMINI_API_URL | https://generativelanguage.googleapis.com/v1beta | Generative text API |
//! | GEMINI_API_KEY | (empty) | Generative text API key |
//! | GEMINI_MODEL | gemini-2.5-flash-preview-05-20 | Model name |
//! | LOG_LEVEL | info | Log filter |
//! | LOG_JSON | false | JSON console output |
//! | LOG_DIR | (unset) | Directory for rolling log files |

use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

pub const DEFAULT_API_URL: &str = "https://doceria-crm-backend.onrender.com/api";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_ALARM_PULSE: Duration = Duration::from_millis(1000);
pub const DEFAULT_BUSINESS_TZ: Tz = chrono_tz::America::Sao_Paulo;

/// Floor for timer periods; `tokio::time::interval` panics on zero
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Identity provider settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_url: String,
    pub api_key: String,
}

/// Object storage settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub api_url: String,
    pub bucket: String,
}

/// Generative text settings
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

/// Logging settings
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
    pub dir: Option<String>,
}

/// Client configuration for the dashboard backend and its collaborators
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST backend base URL (e.g., "http://localhost:3000/api")
    pub base_url: String,

    /// Bearer token for the REST backend, if it requires one
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Snapshot refresh interval
    pub poll_interval: Duration,

    /// Alarm pulse period
    pub alarm_pulse: Duration,

    /// Timezone for "today" and "this week"
    pub business_tz: Tz,

    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub generator: GeneratorConfig,
    pub log: LogConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Period variable in `unit`s; zero is rejected since a timer cannot tick at 0
fn env_period(key: &str, default: Duration, unit: fn(u64) -> Duration) -> Duration {
    let value = std::env::var(key).ok().and_then(|v| v.trim().parse().ok());
    period_or(key, value, default, unit)
}

fn period_or(key: &str, value: Option<u64>, default: Duration, unit: fn(u64) -> Duration) -> Duration {
    match value {
        Some(0) => {
            tracing::warn!(variable = key, "Period must be positive, using default");
            default
        }
        Some(v) => unit(v),
        None => default,
    }
}

impl ClientConfig {
    /// Configuration with defaults for everything but the backend URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            poll_interval: DEFAULT_POLL_INTERVAL,
            alarm_pulse: DEFAULT_ALARM_PULSE,
            business_tz: DEFAULT_BUSINESS_TZ,
            auth: AuthConfig {
                api_url: "https://identitytoolkit.googleapis.com/v1".into(),
                api_key: String::new(),
            },
            storage: StorageConfig {
                api_url: "https://firebasestorage.googleapis.com".into(),
                bucket: "crmdoceria-9959e.firebasestorage.app".into(),
            },
            generator: GeneratorConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta".into(),
                api_key: String::new(),
                model: "gemini-2.5-flash-preview-05-20".into(),
            },
            log: LogConfig {
                level: "info".into(),
                json: false,
                dir: None,
            },
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparseable variables fall back to their defaults, as do
    /// zero periods.
    pub fn from_env() -> Self {
        let defaults = Self::new(DEFAULT_API_URL);

        let business_tz = match std::env::var("BUSINESS_TZ") {
            Ok(name) => name.parse::<Tz>().unwrap_or_else(|e| {
                tracing::warn!(tz = %name, error = %e, "Invalid BUSINESS_TZ, using default");
                DEFAULT_BUSINESS_TZ
            }),
            Err(_) => DEFAULT_BUSINESS_TZ,
        };

        Self {
            base_url: env_or("DOCERIA_API_URL", &defaults.base_url),
            token: std::env::var("DOCERIA_API_TOKEN").ok(),
            timeout: env_parse("REQUEST_TIMEOUT_SECS", defaults.timeout),
            poll_interval: env_period(
                "POLL_INTERVAL_SECS",
                defaults.poll_interval,
                Duration::from_secs,
            ),
            alarm_pulse: env_period("ALARM_PULSE_MS", defaults.alarm_pulse, Duration::from_millis),
            business_tz,
            auth: AuthConfig {
                api_url: env_or("AUTH_API_URL", &defaults.auth.api_url),
                api_key: env_or("AUTH_API_KEY", &defaults.auth.api_key),
            },
            storage: StorageConfig {
                api_url: env_or("STORAGE_API_URL", &defaults.storage.api_url),
                bucket: env_or("STORAGE_BUCKET", &defaults.storage.bucket),
            },
            generator: GeneratorConfig {
                api_url: env_or("GEMINI_API_URL", &defaults.generator.api_url),
                api_key: env_or("GEMINI_API_KEY", &defaults.generator.api_key),
                model: env_or("GEMINI_MODEL", &defaults.generator.model),
            },
            log: LogConfig {
                level: env_or("LOG_LEVEL", &defaults.log.level),
                json: env_parse("LOG_JSON", defaults.log.json),
                dir: std::env::var("LOG_DIR").ok(),
            },
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the refresh interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Point the identity provider somewhere else (tests, emulators)
    pub fn with_auth(mut self, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.auth = AuthConfig {
            api_url: api_url.into(),
            api_key: api_key.into(),
        };
        self
    }

    /// Point object storage somewhere else
    pub fn with_storage(mut self, api_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        self.storage = StorageConfig {
            api_url: api_url.into(),
            bucket: bucket.into(),
        };
        self
    }

    /// Point the generative text API somewhere else
    pub fn with_generator(mut self, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.generator.api_url = api_url.into();
        self.generator.api_key = api_key.into();
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000/api")
    }
}
