//! Bucket CRUD operations

use crate::client::BucketClient;
use crate::logging::Logger;
use crate::request::{RequestBody, RequestSpec};
use crate::{Error, Result};
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Options for bucket creation; `access` and `groups` are required by the service
#[derive(Clone, Debug)]
pub struct CreateBucketOptions {
    pub access: String,
    pub groups: Vec<String>,
    /// Additional fields forwarded verbatim
    pub extra: Map<String, Value>,
}

impl CreateBucketOptions {
    pub fn new(access: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            access: access.into(),
            groups,
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }
}

/// Bucket management over the request pipeline
pub struct BucketManager {
    client: Arc<BucketClient>,
    logger: Arc<dyn Logger>,
}

impl BucketManager {
    pub fn new(client: Arc<BucketClient>, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }

    /// Create a bucket
    pub async fn create(&self, name: &str, options: CreateBucketOptions) -> Result<Value> {
        let mut payload = options.extra;
        payload.insert("name".to_string(), Value::String(name.to_string()));
        payload.insert("access".to_string(), Value::String(options.access));
        payload.insert(
            "groups".to_string(),
            Value::Array(options.groups.into_iter().map(Value::String).collect()),
        );

        let response = self
            .client
            .request(Method::POST, "/buckets", RequestBody::Json(Value::Object(payload)))
            .await?;
        self.logger
            .log("info", "Bucket create response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// Update fields of an existing bucket
    pub async fn update(&self, name: &str, fields: Map<String, Value>) -> Result<Value> {
        if fields.is_empty() {
            return Err(Error::Config("update fields cannot be empty".to_string()));
        }

        let response = self
            .client
            .request(
                Method::PUT,
                &format!("/buckets/{name}"),
                RequestBody::Json(Value::Object(fields)),
            )
            .await?;
        self.logger
            .log("info", "Bucket update response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// Delete a bucket; the service requires an explicit confirmation string
    pub async fn delete(&self, name: &str, confirmation: Option<&str>) -> Result<Value> {
        let response = self
            .client
            .request(
                Method::DELETE,
                &format!("/buckets/{name}"),
                RequestBody::Json(json!({
                    "confirmation": confirmation.unwrap_or("DELETE"),
                })),
            )
            .await?;
        self.logger
            .log("info", "Bucket delete response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// List buckets, with optional filters
    pub async fn list(&self, query: HashMap<String, String>) -> Result<Value> {
        let response = self
            .client
            .send(RequestSpec::get("/buckets").query_map(&query))
            .await?
            .into_json();
        self.logger
            .log("info", "Bucket list response", &json!({ "response": response }))
            .await;
        Ok(response)
    }

    /// Aggregate bucket statistics
    pub async fn stats(&self) -> Result<Value> {
        let response = self
            .client
            .request(Method::GET, "/buckets/stats", RequestBody::None)
            .await?;
        self.logger
            .log("info", "Bucket stats response", &json!({ "response": response }))
            .await;
        Ok(response)
    }
}
