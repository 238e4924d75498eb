//! Request and response model

use bytes::Bytes;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Request body, one kind per request
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// JSON body, sent with `Content-Type: application/json`
    Json(Value),
    /// `multipart/form-data` body; the transport owns the boundary
    Multipart(Vec<MultipartPart>),
}

/// Content of a single multipart part
#[derive(Debug)]
pub enum PartContent {
    Text(String),
    Bytes(Bytes),
    /// Read from disk when the request is built
    File(PathBuf),
}

/// One field of a `multipart/form-data` body, consumed by a single request
#[derive(Debug)]
pub struct MultipartPart {
    pub name: String,
    pub content: PartContent,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
}

impl MultipartPart {
    /// Plain text field
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::Text(value.into()),
            filename: None,
            mime_type: None,
        }
    }

    /// Inline bytes field
    pub fn bytes(name: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::Bytes(value.into()),
            filename: None,
            mime_type: None,
        }
    }

    /// File-backed field; filename defaults to the path's file name and the
    /// MIME type is sniffed from the path unless overridden
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::File(path.into()),
            filename: None,
            mime_type: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// A single request against the bucket service
#[derive(Debug)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
    /// Merged after default headers; last entry wins on conflict
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::None,
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set a JSON body
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Set a multipart body
    pub fn multipart(mut self, parts: Vec<MultipartPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Append a caller header (takes precedence over defaults)
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append all entries of a query map
    pub fn query_map(mut self, params: &HashMap<String, String>) -> Self {
        for (name, value) in params {
            self.query.push((name.clone(), value.clone()));
        }
        self
    }

    /// Whether this request targets the error-reporting endpoint
    pub fn is_error_report(&self) -> bool {
        let path = self.path.trim_start_matches('/');
        path == "errors" || path.starts_with("errors/") || path.starts_with("errors?")
    }
}

/// Captured response: status, headers, raw body, and leniently decoded JSON
#[derive(Clone, Debug)]
pub struct ResponseEnvelope {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
    json: Value,
}

impl ResponseEnvelope {
    pub fn new(status: u16, headers: HashMap<String, String>, body: Bytes) -> Self {
        // non-JSON and empty bodies decode to an empty object, never an error
        let json = serde_json::from_slice(&body).unwrap_or_else(|_| Value::Object(Default::default()));
        Self {
            status,
            headers,
            body,
            json,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Raw response bytes
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Decoded JSON body; `{}` when the body was empty or not valid JSON
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Consume the envelope, yielding the decoded JSON body
    pub fn into_json(self) -> Value {
        self.json
    }

    /// Human-readable error message for a failed response: the `error` field,
    /// then `message`, else a synthesized `HTTP error {status}`
    pub fn error_message(&self) -> String {
        self.json
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| self.json.get("message").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error {}", self.status))
    }
}
