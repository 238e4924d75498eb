//! Remote activity logs and error reports

use crate::client::BucketClient;
use crate::logging::Logger;
use crate::request::{RequestBody, RequestSpec};
use crate::Result;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Options for [`ErrorManager::save`]
#[derive(Clone, Debug, Default)]
pub struct ErrorReport {
    /// Severity name, e.g. `error`
    pub level: Option<String>,
    /// Arbitrary structured context
    pub context: Option<Value>,
    /// Stack trace or equivalent; serialized to a JSON string on the wire
    pub trace_log: Option<Value>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_trace(mut self, trace: Value) -> Self {
        self.trace_log = Some(trace);
        self
    }
}

/// Activity log endpoint wrapper (`/logs`)
pub struct LogManager {
    client: Arc<BucketClient>,
    logger: Arc<dyn Logger>,
}

impl LogManager {
    pub fn new(client: Arc<BucketClient>, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }

    /// Record one user action
    pub async fn save(&self, uid: &str, action: &str, metadata: Value) -> Result<Value> {
        let response = self
            .client
            .request(
                Method::POST,
                "/logs",
                RequestBody::Json(json!({
                    "uid": uid,
                    "action": action,
                    "metadata": metadata,
                })),
            )
            .await?;
        self.logger
            .log("info", "Log save response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// List logs matching the filters
    pub async fn index(&self, filters: HashMap<String, String>) -> Result<Value> {
        let response = self
            .client
            .send(RequestSpec::get("/logs").query_map(&filters))
            .await?
            .into_json();
        self.logger
            .log("info", "Log index response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// Delete logs matching the filters
    pub async fn delete(&self, filters: Value) -> Result<Value> {
        let response = self
            .client
            .request(Method::DELETE, "/logs", RequestBody::Json(filters))
            .await?;
        self.logger
            .log("info", "Log delete response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// Aggregate log statistics
    pub async fn stats(&self) -> Result<Value> {
        let response = self
            .client
            .request(Method::GET, "/logs/stats", RequestBody::None)
            .await?;
        self.logger
            .log("info", "Log stats response", &json!({ "response": response }))
            .await;
        Ok(response)
    }
}

/// Error report endpoint wrapper (`/errors`)
pub struct ErrorManager {
    client: Arc<BucketClient>,
    logger: Arc<dyn Logger>,
}

impl ErrorManager {
    pub fn new(client: Arc<BucketClient>, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }

    /// Store one error report
    pub async fn save(&self, message: &str, options: ErrorReport) -> Result<Value> {
        let mut payload = serde_json::Map::new();
        payload.insert("message".to_string(), Value::String(message.to_string()));
        if let Some(level) = options.level {
            payload.insert("level".to_string(), Value::String(level));
        }
        if let Some(context) = options.context {
            payload.insert("context".to_string(), context);
        }
        // the service stores the trace as a string column
        let trace = options.trace_log.unwrap_or(Value::String(String::new()));
        let trace = match trace {
            Value::String(s) => s,
            other => serde_json::to_string(&other).unwrap_or_default(),
        };
        payload.insert("trace_log".to_string(), Value::String(trace));

        let response = self
            .client
            .request(Method::POST, "/errors", RequestBody::Json(Value::Object(payload)))
            .await?;
        self.logger
            .log("info", "Error save response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// List error reports matching the filters
    pub async fn index(&self, filters: HashMap<String, String>) -> Result<Value> {
        let response = self
            .client
            .send(RequestSpec::get("/errors").query_map(&filters))
            .await?
            .into_json();
        self.logger
            .log("info", "Error index response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// Delete error reports matching the filters
    pub async fn delete(&self, filters: Value) -> Result<Value> {
        let response = self
            .client
            .request(Method::DELETE, "/errors", RequestBody::Json(filters))
            .await?;
        self.logger
            .log("info", "Error delete response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// Aggregate error statistics
    pub async fn stats(&self) -> Result<Value> {
        let response = self
            .client
            .request(Method::GET, "/errors/stats", RequestBody::None)
            .await?;
        self.logger
            .log("info", "Error stats response", &json!({ "response": response }))
            .await;
        Ok(response)
    }
}
