//! SDK configuration

use std::time::Duration;

/// SDK configuration, read-only after construction
#[derive(Clone, Debug)]
pub struct Config {
    /// Bucket service base URL
    pub api_base_url: String,
    /// Statically configured API key, if any
    pub api_key: Option<String>,
    /// Disable TLS peer and host verification
    pub disable_ssl_verify: bool,
    /// Environment tag attached to error reports
    pub environment: Option<String>,
    /// Service tag attached to error reports
    pub service: Option<String>,
    /// Public domain used to build local file links
    pub domain: Option<String>,
    /// Whether remote log forwarding is enabled
    pub log_enabled: bool,
    /// Channel name for forwarded logs
    pub log_channel: String,
    /// Bucket used when the caller does not name one
    pub default_bucket: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            api_key: None,
            disable_ssl_verify: false,
            environment: None,
            service: None,
            domain: None,
            log_enabled: false,
            log_channel: "dui_bucket".to_string(),
            default_bucket: "public".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("dui-bucket-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Create a new config with the given base URL
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Default::default()
        }
    }

    /// Build a config from the `DUI_BUCKET_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("DUI_BUCKET_SDK_ENDPOINT") {
            config.api_base_url = url;
        }
        if let Ok(key) = std::env::var("DUI_BUCKET_SDK_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(bucket) = std::env::var("DUI_BUCKET_DEFAULT_BUCKET") {
            if !bucket.is_empty() {
                config.default_bucket = bucket;
            }
        }
        if let Ok(channel) = std::env::var("DUI_BUCKET_LOG_CHANNEL") {
            if !channel.is_empty() {
                config.log_channel = channel;
            }
        }
        config.log_enabled = env_flag("DUI_BUCKET_LOG_ENABLED");
        config.disable_ssl_verify = env_flag("DUI_DISABLE_SSL_VERIFY");
        config.environment = std::env::var("DUI_BUCKET_ENVIRONMENT").ok().filter(|v| !v.is_empty());
        config.service = std::env::var("DUI_BUCKET_SERVICE").ok().filter(|v| !v.is_empty());
        config.domain = std::env::var("DUI_BUCKET_DOMAIN").ok().filter(|v| !v.is_empty());
        config
    }

    /// Set the static API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Disable TLS verification (peer and host)
    pub fn with_ssl_verify_disabled(mut self) -> Self {
        self.disable_ssl_verify = true;
        self
    }

    /// Set the environment tag
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Set the service tag
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Set the public domain for local file links
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Enable remote log forwarding
    pub fn with_log_enabled(mut self) -> Self {
        self.log_enabled = true;
        self
    }

    /// Set the log channel name
    pub fn with_log_channel(mut self, channel: impl Into<String>) -> Self {
        self.log_channel = channel.into();
        self
    }

    /// Set the default bucket
    pub fn with_default_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.default_bucket = bucket.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL with any trailing slash trimmed
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
