//! Logging capability and the self-reporting remote logger

use crate::client::BucketClient;
use crate::request::RequestSpec;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Log sink used by the SDK for debug tracing and error escalation.
///
/// Implementations must never fail: the signature is infallible and any
/// internal failure has to be swallowed, so observability can never
/// destabilize the primary operation.
#[async_trait]
pub trait Logger: Send + Sync {
    async fn log(&self, level: &str, message: &str, context: &Value);
}

/// PSR-style log levels, most severe first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a level name; unknown names are treated as `Info`
    pub fn parse(level: &str) -> Self {
        match level.to_ascii_lowercase().as_str() {
            "emergency" => Self::Emergency,
            "alert" => Self::Alert,
            "critical" => Self::Critical,
            "error" => Self::Error,
            "warning" => Self::Warning,
            "notice" => Self::Notice,
            "debug" => Self::Debug,
            _ => Self::Info,
        }
    }
}

/// Discards everything; the trace sink for the reporting client itself
pub struct NoopLogger;

#[async_trait]
impl Logger for NoopLogger {
    async fn log(&self, _level: &str, _message: &str, _context: &Value) {}
}

/// Forwards SDK log calls onto the host's `tracing` subscriber
pub struct TracingLogger;

#[async_trait]
impl Logger for TracingLogger {
    async fn log(&self, level: &str, message: &str, context: &Value) {
        match LogLevel::parse(level) {
            LogLevel::Emergency | LogLevel::Alert | LogLevel::Critical | LogLevel::Error => {
                tracing::error!(%context, "{message}")
            }
            LogLevel::Warning => tracing::warn!(%context, "{message}"),
            LogLevel::Notice | LogLevel::Info => tracing::info!(%context, "{message}"),
            LogLevel::Debug => tracing::debug!(%context, "{message}"),
        }
    }
}

/// Re-entrancy lock around the error self-report path.
///
/// Reporting an error makes an HTTP call; if that call fails and its failure
/// is routed back into the same logger, the report must not retry itself.
/// One permit exists per guard, released on drop on every exit path.
#[derive(Default)]
pub struct ReportGuard {
    locked: AtomicBool,
}

impl ReportGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the permit, or `None` when a report is already in flight
    pub fn try_acquire(&self) -> Option<ReportPermit<'_>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ReportPermit { guard: self })
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

/// Held while a report attempt is in flight; clears the lock when dropped
pub struct ReportPermit<'a> {
    guard: &'a ReportGuard,
}

impl Drop for ReportPermit<'_> {
    fn drop(&mut self) {
        self.guard.locked.store(false, Ordering::Release);
    }
}

/// Logger that escalates records to the service's `/errors` endpoint.
///
/// Every report goes through the shared request pipeline, so a broken
/// reporting channel would otherwise recurse: the pipeline traces into this
/// logger, which would post to `/errors` again. [`ReportGuard`] cuts that
/// loop, and any failure of the report attempt is swallowed.
pub struct RemoteLogger {
    client: Arc<BucketClient>,
    guard: ReportGuard,
    min_level: LogLevel,
}

impl RemoteLogger {
    /// Report at `Error` severity and above
    pub fn new(client: Arc<BucketClient>) -> Self {
        Self::with_min_level(client, LogLevel::Error)
    }

    /// Report at `min_level` severity and above
    pub fn with_min_level(client: Arc<BucketClient>, min_level: LogLevel) -> Self {
        Self {
            client,
            guard: ReportGuard::new(),
            min_level,
        }
    }
}

#[async_trait]
impl Logger for RemoteLogger {
    async fn log(&self, level: &str, message: &str, context: &Value) {
        if LogLevel::parse(level) > self.min_level {
            return;
        }
        let Some(_permit) = self.guard.try_acquire() else {
            return;
        };

        let trace = context
            .get("trace_log")
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        let extra = context.get("context").cloned().unwrap_or_else(|| {
            let mut remaining = context.clone();
            if let Some(map) = remaining.as_object_mut() {
                map.remove("trace_log");
            }
            remaining
        });

        let payload = json!({
            "message": message,
            "level": level,
            "channel": self.client.config().log_channel,
            "trace_log": trace,
            "context": extra,
        });

        // silent fail; the permit drops on every path
        let _ = self
            .client
            .send(RequestSpec::post("/errors").json(payload))
            .await;
    }
}
