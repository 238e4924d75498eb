//! File upload, download, listing, and link generation

use crate::client::BucketClient;
use crate::logging::Logger;
use crate::request::{MultipartPart, RequestSpec, ResponseEnvelope};
use crate::types::{FileRecord, LinkEntry, Paginated, UploadOptions};
use crate::{Error, Result};
use bytes::Bytes;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// File operations over the request pipeline
pub struct FileManager {
    client: Arc<BucketClient>,
    logger: Arc<dyn Logger>,
}

impl FileManager {
    pub fn new(client: Arc<BucketClient>, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }

    /// Upload a local file into a bucket.
    ///
    /// Sent as `multipart/form-data`: the `bucket` and `encrypt` fields, the
    /// file itself under the `file` field, plus optional `path`/`name`.
    pub async fn upload(
        &self,
        file_path: impl AsRef<Path>,
        bucket: &str,
        options: UploadOptions,
    ) -> Result<FileRecord> {
        let file_path = file_path.as_ref();
        let metadata = tokio::fs::metadata(file_path).await?;
        if !metadata.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", file_path.display()),
            )));
        }

        let mut parts = vec![
            MultipartPart::text("bucket", bucket),
            MultipartPart::file("file", file_path),
            MultipartPart::text("encrypt", if options.encrypt { "1" } else { "0" }),
        ];
        if let Some(path) = &options.path {
            parts.push(MultipartPart::text("path", path.clone()));
        }
        if let Some(name) = &options.name {
            parts.push(MultipartPart::text("name", name.clone()));
        }

        let envelope = self
            .client
            .send(RequestSpec::post("/files").multipart(parts))
            .await?;
        self.log_response("File upload response", &envelope).await;
        decode(payload(envelope.into_json()))
    }

    /// Upload into the configured default bucket
    pub async fn upload_default(
        &self,
        file_path: impl AsRef<Path>,
        options: UploadOptions,
    ) -> Result<FileRecord> {
        let bucket = self.client.config().default_bucket.clone();
        self.upload(file_path, &bucket, options).await
    }

    /// Information about a single file
    pub async fn info(&self, bucket: &str, uuid: &str) -> Result<FileRecord> {
        let envelope = self
            .client
            .send(RequestSpec::get(format!("/buckets/{bucket}/files/{uuid}")))
            .await?;
        decode(payload(envelope.into_json()))
    }

    /// Delete a file by bucket and UUID
    pub async fn delete(&self, bucket: &str, uuid: &str) -> Result<()> {
        self.client
            .send(RequestSpec::delete(format!("/buckets/{bucket}/files/{uuid}")))
            .await?;
        Ok(())
    }

    /// List files in one bucket with optional filters and pagination
    pub async fn list(
        &self,
        bucket: &str,
        query: HashMap<String, String>,
    ) -> Result<Paginated<FileRecord>> {
        let envelope = self
            .client
            .send(RequestSpec::get(format!("/buckets/{bucket}/files")).query_map(&query))
            .await?;
        decode(payload(envelope.into_json()))
    }

    /// List files across all buckets with filters and sorting
    pub async fn list_all(&self, query: HashMap<String, String>) -> Result<Paginated<FileRecord>> {
        let envelope = self
            .client
            .send(RequestSpec::get("/files").query_map(&query))
            .await?;
        decode(payload(envelope.into_json()))
    }

    /// Generate a download link for a single file
    pub async fn generate_link(&self, uuid: &str) -> Result<String> {
        let envelope = self
            .client
            .send(RequestSpec::get(format!("/files/{uuid}/link")))
            .await?;
        envelope
            .json()
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Decode("link response is missing 'url'".to_string()))
    }

    /// Generate download links for multiple files; per-file failures appear
    /// as [`LinkEntry::error`] rather than failing the whole call
    pub async fn generate_links(&self, uuids: &[String]) -> Result<HashMap<String, LinkEntry>> {
        let envelope = self
            .client
            .send(RequestSpec::post("/files/links").json(json!({ "uuids": uuids })))
            .await?;
        let links = envelope
            .json()
            .get("links")
            .cloned()
            .ok_or_else(|| Error::Decode("links response is missing 'links'".to_string()))?;
        decode(links)
    }

    /// Download a file's raw bytes, optionally with signed-URL query parameters
    pub async fn download(&self, uuid: &str, query: HashMap<String, String>) -> Result<Bytes> {
        let envelope = self
            .client
            .send(RequestSpec::get(format!("/files/{uuid}")).query_map(&query))
            .await?;
        Ok(envelope.bytes().clone())
    }

    /// Public link built from the configured domain, without a service call
    pub fn local_link(&self, uuid: &str) -> Result<String> {
        let domain = self
            .client
            .config()
            .domain
            .as_deref()
            .ok_or_else(|| Error::Config("domain is not configured".to_string()))?;
        Ok(format!("{}/files/{uuid}", domain.trim_end_matches('/')))
    }

    async fn log_response(&self, message: &str, envelope: &ResponseEnvelope) {
        self.logger
            .log("info", message, &json!({ "response": envelope.json() }))
            .await;
    }
}

/// Unwrap the service's `data` envelope when present
fn payload(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
}
