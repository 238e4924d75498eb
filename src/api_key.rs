//! API key resolution strategies
//!
//! The pipeline authenticates every request with a service API key. Hosts
//! plug in whichever resolution strategy fits their deployment: environment
//! variables, a static value with an optional runtime resolver, or a lookup
//! against an external client directory.

use crate::{Error, Result};
use std::sync::Arc;

/// Supplies the secret used to authenticate to the bucket service
pub trait ApiKeyProvider: Send + Sync {
    /// Resolve the API key, failing with [`Error::Config`] when no source yields one
    fn api_key(&self) -> Result<String>;
}

/// Resolves the API key from an environment variable, with an optional default
pub struct EnvApiKeyProvider {
    env_name: String,
    default: Option<String>,
}

impl EnvApiKeyProvider {
    /// Default environment variable consulted by [`EnvApiKeyProvider::default`]
    pub const DEFAULT_ENV: &'static str = "DUI_BUCKET_API_KEY";

    pub fn new(env_name: impl Into<String>, default: Option<String>) -> Self {
        Self {
            env_name: env_name.into(),
            default,
        }
    }
}

impl Default for EnvApiKeyProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ENV, None)
    }
}

impl ApiKeyProvider for EnvApiKeyProvider {
    fn api_key(&self) -> Result<String> {
        match std::env::var(&self.env_name) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => self.default.clone().ok_or_else(|| {
                Error::Config(format!(
                    "API key not found in environment variable '{}' and no default provided",
                    self.env_name
                ))
            }),
        }
    }
}

/// Closure yielding an API key, or `None` to fall through to the next source
pub type ApiKeyResolver = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Provider combining a runtime resolver with a statically configured key.
///
/// Resolution order: the resolver (when set and yielding a non-empty string),
/// then the static key (when non-empty). Lets a host override the key per
/// request context without a new provider type.
#[derive(Default)]
pub struct DynamicApiKeyProvider {
    resolver: Option<ApiKeyResolver>,
    key: Option<String>,
}

impl DynamicApiKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the static key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the runtime resolver
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }
}

impl ApiKeyProvider for DynamicApiKeyProvider {
    fn api_key(&self) -> Result<String> {
        if let Some(resolver) = &self.resolver {
            if let Some(key) = resolver() {
                if !key.is_empty() {
                    return Ok(key);
                }
            }
        }

        if let Some(key) = &self.key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }

        Err(Error::Config("API key not provided".to_string()))
    }
}

/// Activation state of a directory client record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientStatus {
    Active,
    Inactive,
}

/// A named API client record held in an external store
#[derive(Clone, Debug)]
pub struct ClientRecord {
    pub name: String,
    pub api_key: String,
    pub status: ClientStatus,
}

/// External store of API client records, keyed by client name
pub trait ClientDirectory: Send + Sync {
    /// Look up a client record by name; `Ok(None)` when no record exists
    fn lookup(&self, name: &str) -> Result<Option<ClientRecord>>;
}

/// Resolves the API key from a [`ClientDirectory`], requiring an active record
pub struct DirectoryApiKeyProvider {
    directory: Arc<dyn ClientDirectory>,
    client_name: String,
}

impl DirectoryApiKeyProvider {
    pub fn new(directory: Arc<dyn ClientDirectory>, client_name: impl Into<String>) -> Self {
        Self {
            directory,
            client_name: client_name.into(),
        }
    }
}

impl ApiKeyProvider for DirectoryApiKeyProvider {
    fn api_key(&self) -> Result<String> {
        let record = self
            .directory
            .lookup(&self.client_name)
            .map_err(|e| Error::Config(format!("API client directory lookup failed: {e}")))?
            .filter(|record| record.status == ClientStatus::Active)
            .ok_or_else(|| {
                Error::Config(format!(
                    "API client '{}' not found or inactive",
                    self.client_name
                ))
            })?;
        Ok(record.api_key)
    }
}
