//! HTTP request pipeline for the bucket service

use crate::api_key::ApiKeyProvider;
use crate::encryption::PayloadEncryptor;
use crate::logging::Logger;
use crate::request::{MultipartPart, PartContent, RequestBody, RequestSpec, ResponseEnvelope};
use crate::{Config, Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, COOKIE};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Client for the bucket service HTTP API.
///
/// Owns one `reqwest::Client` and composes authentication, body encoding,
/// and status classification for every call. Failures against the
/// error-reporting endpoint are suppressed rather than propagated, so a
/// broken reporting channel cannot cascade into application failure.
pub struct BucketClient {
    config: Config,
    logger: Arc<dyn Logger>,
    api_keys: Arc<dyn ApiKeyProvider>,
    encryption: PayloadEncryptor,
    http: reqwest::Client,
    user_token: RwLock<Option<String>>,
    lang: RwLock<Option<String>>,
}

impl BucketClient {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger>,
        api_keys: Arc<dyn ApiKeyProvider>,
        encryption: PayloadEncryptor,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone());

        if config.disable_ssl_verify {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let http = builder.build()?;

        Ok(Self {
            config,
            logger,
            api_keys,
            encryption,
            http,
            user_token: RwLock::new(None),
            lang: RwLock::new(None),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Set or clear the per-user bearer token
    pub fn set_user_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.user_token.write() {
            *guard = token;
        }
    }

    /// Set or clear the locale forwarded as the `Lang` header
    pub fn set_lang(&self, lang: Option<String>) {
        if let Ok(mut guard) = self.lang.write() {
            *guard = lang;
        }
    }

    /// Execute a request and return the decoded JSON body
    pub async fn request(&self, method: Method, path: &str, body: RequestBody) -> Result<Value> {
        let mut spec = RequestSpec::new(method, path);
        spec.body = body;
        Ok(self.send(spec).await?.into_json())
    }

    /// Execute a request and return the full response envelope
    pub async fn send(&self, spec: RequestSpec) -> Result<ResponseEnvelope> {
        let url = format!(
            "{}/{}",
            self.config.base_url(),
            spec.path.trim_start_matches('/')
        );

        // caller extras merge last, overriding defaults on conflict; a name
        // the caller repeats within one request keeps every occurrence
        let mut headers = self.default_headers()?;
        let mut caller_set: HashSet<HeaderName> = HashSet::new();
        for (name, value) in &spec.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::Config(format!("invalid header name: {name}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::Config(format!("invalid value for header {name}")))?;
            if caller_set.contains(&name) {
                headers.append(name, value);
            } else {
                headers.insert(name.clone(), value);
                caller_set.insert(name);
            }
        }

        let trace_headers = redacted_headers(&headers);
        let trace_body = match &spec.body {
            RequestBody::None => Value::Null,
            RequestBody::Json(value) => value.clone(),
            RequestBody::Multipart(parts) => {
                Value::String(format!("multipart/form-data, {} parts", parts.len()))
            }
        };

        let is_error_report = spec.is_error_report();

        let mut request = self.http.request(spec.method.clone(), &url);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        request = request.headers(headers);

        request = match spec.body {
            RequestBody::None => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(parts) => request.multipart(build_form(parts).await?),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let message = err.to_string();
                self.trace(&spec.method, &url, &trace_headers, &trace_body, None, &message)
                    .await;
                return Err(Error::Transport(message));
            }
        };

        let status = response.status();
        let headers = collect_headers(response.headers());
        let body = match response.bytes().await {
            Ok(body) => body,
            // a connection dropped mid-body must not pass as success
            Err(err) => {
                let message = err.to_string();
                self.trace(&spec.method, &url, &trace_headers, &trace_body, Some(status), &message)
                    .await;
                return Err(Error::Transport(message));
            }
        };
        let envelope = ResponseEnvelope::new(status.as_u16(), headers, body);

        self.trace(
            &spec.method,
            &url,
            &trace_headers,
            &trace_body,
            Some(status),
            &String::from_utf8_lossy(envelope.bytes()),
        )
        .await;

        if envelope.is_success() {
            return Ok(envelope);
        }

        let message = envelope.error_message();
        if is_error_report {
            // a failed error report is logged once and swallowed
            self.logger
                .log(
                    "error",
                    &format!("error report rejected: {message}"),
                    &json!({ "url": url, "status": envelope.status() }),
                )
                .await;
            return Ok(envelope);
        }

        Err(Error::Http {
            status: envelope.status(),
            message,
        })
    }

    /// Report an application error to the service's `/errors` endpoint
    pub async fn send_error(&self, message: &str, trace: &str) -> Result<()> {
        self.request(
            Method::POST,
            "/errors",
            RequestBody::Json(json!({
                "level": "error",
                "message": message,
                "trace": trace,
                "environment": self.config.environment,
                "service": self.config.service,
                "url": self.config.domain,
            })),
        )
        .await?;
        Ok(())
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let api_key = self.api_keys.api_key()?;
        let cookie = format!("x-api-key={}", self.encryption.encrypt(&api_key)?);
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&cookie)
                .map_err(|_| Error::Config("encrypted API key is not a valid header value".to_string()))?,
        );

        if let Some(token) = self.user_token.read().ok().and_then(|guard| guard.clone()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| Error::Config("user token is not a valid header value".to_string()))?,
            );
        }

        if let Some(lang) = self.lang.read().ok().and_then(|guard| guard.clone()) {
            headers.insert(
                HeaderName::from_static("lang"),
                HeaderValue::from_str(&lang)
                    .map_err(|_| Error::Config("lang is not a valid header value".to_string()))?,
            );
        }

        Ok(headers)
    }

    /// Best-effort debug trace of one pipeline execution
    async fn trace(
        &self,
        method: &Method,
        url: &str,
        headers: &Value,
        body: &Value,
        status: Option<StatusCode>,
        detail: &str,
    ) {
        tracing::debug!(%method, %url, ?status, "bucket service request");
        self.logger
            .log(
                "debug",
                "bucket service request",
                &json!({
                    "method": method.as_str(),
                    "url": url,
                    "headers": headers,
                    "body": body,
                    "status": status.map(|s| s.as_u16()),
                    "response": detail,
                }),
            )
            .await;
    }
}

/// Request headers as a JSON object; the cookie carries the API key and is
/// never written out
fn redacted_headers(headers: &HeaderMap) -> Value {
    Value::Object(
        headers
            .iter()
            .map(|(name, value)| {
                let shown = if *name == COOKIE {
                    "[redacted]".to_string()
                } else {
                    value.to_str().unwrap_or("[binary]").to_string()
                };
                (name.as_str().to_string(), Value::String(shown))
            })
            .collect(),
    )
}

fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

async fn build_form(parts: Vec<MultipartPart>) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();

    for part in parts {
        let MultipartPart {
            name,
            content,
            filename,
            mime_type,
        } = part;

        let mut piece = match content {
            PartContent::Text(value) => reqwest::multipart::Part::text(value),
            PartContent::Bytes(bytes) => reqwest::multipart::Part::bytes(bytes.to_vec()),
            PartContent::File(path) => {
                let data = tokio::fs::read(&path).await?;
                let filename = filename.clone().or_else(|| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                });
                let mime = mime_type.clone().unwrap_or_else(|| {
                    mime_guess::from_path(&path)
                        .first_or_octet_stream()
                        .essence_str()
                        .to_string()
                });
                let mut piece = reqwest::multipart::Part::bytes(data)
                    .mime_str(&mime)
                    .map_err(|_| Error::Config(format!("invalid MIME type: {mime}")))?;
                if let Some(filename) = filename {
                    piece = piece.file_name(filename);
                }
                form = form.part(name, piece);
                continue;
            }
        };

        if let Some(filename) = filename {
            piece = piece.file_name(filename);
        }
        if let Some(mime) = mime_type {
            piece = piece
                .mime_str(&mime)
                .map_err(|_| Error::Config(format!("invalid MIME type: {mime}")))?;
        }
        form = form.part(name, piece);
    }

    Ok(form)
}
