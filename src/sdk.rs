//! SDK composition root and fatal error escalation

use crate::api_key::{ApiKeyProvider, DynamicApiKeyProvider, EnvApiKeyProvider};
use crate::bucket::BucketManager;
use crate::client::BucketClient;
use crate::encryption::PayloadEncryptor;
use crate::file::FileManager;
use crate::logging::{Logger, RemoteLogger, TracingLogger};
use crate::report::{ErrorManager, LogManager};
use crate::{Config, Result};
use serde_json::json;
use std::sync::Arc;

/// Fully wired SDK instance.
///
/// Constructed once by the host application and passed by reference; there is
/// no ambient global state. The managers share one [`BucketClient`] and one
/// escalation [`Logger`].
pub struct BucketSdk {
    client: Arc<BucketClient>,
    logger: Arc<dyn Logger>,
}

impl BucketSdk {
    /// Wire the SDK from configuration.
    ///
    /// The API key comes from `config.api_key` when set, falling back to the
    /// `DUI_BUCKET_API_KEY` environment variable; the cookie cipher reads its
    /// key and IV from the environment. The pipeline traces through
    /// [`TracingLogger`]; manager-level escalation posts to `/errors` via
    /// [`RemoteLogger`] when `log_enabled` is set.
    pub fn new(config: Config) -> Result<Self> {
        let provider: Arc<dyn ApiKeyProvider> = match &config.api_key {
            Some(key) => Arc::new(DynamicApiKeyProvider::new().with_key(key.clone())),
            None => Arc::new(EnvApiKeyProvider::default()),
        };
        let encryption = PayloadEncryptor::from_env()?;
        Self::with_components(config, Arc::new(TracingLogger), provider, encryption)
    }

    /// Wire the SDK from explicit components
    pub fn with_components(
        config: Config,
        trace_logger: Arc<dyn Logger>,
        api_keys: Arc<dyn ApiKeyProvider>,
        encryption: PayloadEncryptor,
    ) -> Result<Self> {
        let log_enabled = config.log_enabled;
        let client = Arc::new(BucketClient::new(
            config,
            trace_logger.clone(),
            api_keys,
            encryption,
        )?);

        let logger: Arc<dyn Logger> = if log_enabled {
            Arc::new(RemoteLogger::new(client.clone()))
        } else {
            trace_logger
        };

        Ok(Self { client, logger })
    }

    /// The shared request pipeline
    pub fn client(&self) -> Arc<BucketClient> {
        self.client.clone()
    }

    /// The escalation logger shared by the managers
    pub fn logger(&self) -> Arc<dyn Logger> {
        self.logger.clone()
    }

    /// Bucket CRUD
    pub fn buckets(&self) -> BucketManager {
        BucketManager::new(self.client.clone(), self.logger.clone())
    }

    /// File upload/download/listing/links
    pub fn files(&self) -> FileManager {
        FileManager::new(self.client.clone(), self.logger.clone())
    }

    /// Remote activity logs
    pub fn logs(&self) -> LogManager {
        LogManager::new(self.client.clone(), self.logger.clone())
    }

    /// Remote error reports
    pub fn errors(&self) -> ErrorManager {
        ErrorManager::new(self.client.clone(), self.logger.clone())
    }

    /// Fatal escalation handle bound to this SDK's client and logger
    pub fn fatal_reporter(&self) -> FatalReporter {
        FatalReporter::new(self.logger.clone(), self.client.clone())
    }
}

/// Explicit handle for escalating unrecoverable failures.
///
/// The host application constructs one at startup and calls it from its own
/// panic/shutdown handling; the library installs no process-wide hooks.
/// Both escalation paths are best-effort and never fail.
pub struct FatalReporter {
    logger: Arc<dyn Logger>,
    client: Arc<BucketClient>,
}

impl FatalReporter {
    pub fn new(logger: Arc<dyn Logger>, client: Arc<BucketClient>) -> Self {
        Self { logger, client }
    }

    /// Escalate a fatal error to the logger and the reporting endpoint
    pub async fn report(&self, message: &str, trace: &str) {
        self.logger
            .log("critical", message, &json!({ "trace_log": trace }))
            .await;
        let _ = self.client.send_error(message, trace).await;
    }
}
