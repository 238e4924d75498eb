//! # DUI Bucket SDK
//!
//! Client SDK for the DUI bucket file-storage service: bucket CRUD, file
//! upload/download/listing/link generation, and centralized error/log
//! reporting over one HTTP pipeline.
//!
//! The pipeline ([`BucketClient`]) composes authentication (an encrypted API
//! key in a cookie header plus an optional bearer token), JSON or multipart
//! body encoding, and status-driven error classification. Failures of the
//! error-reporting endpoint itself are suppressed, and the self-reporting
//! logger carries a re-entrancy guard, so a broken reporting channel can
//! never cascade into application failure.
//!
//! ## Example
//!
//! ```rust,ignore
//! use dui_bucket_sdk::{BucketSdk, Config, UploadOptions};
//!
//! #[tokio::main]
//! async fn main() -> dui_bucket_sdk::Result<()> {
//!     let sdk = BucketSdk::new(
//!         Config::new("https://bucket.example.com")
//!             .with_api_key("service-key")
//!             .with_environment("production")
//!             .with_service("checkout"),
//!     )?;
//!
//!     let record = sdk
//!         .files()
//!         .upload("./invoice.pdf", "public", UploadOptions::new())
//!         .await?;
//!     println!("uploaded {} as {}", record.name, record.uuid);
//!
//!     let link = sdk.files().generate_link(&record.uuid.to_string()).await?;
//!     println!("download: {link}");
//!
//!     Ok(())
//! }
//! ```

mod api_key;
mod bucket;
mod client;
mod config;
mod encryption;
mod error;
mod file;
mod logging;
mod report;
mod request;
mod sdk;
mod types;

pub use api_key::{
    ApiKeyProvider, ApiKeyResolver, ClientDirectory, ClientRecord, ClientStatus,
    DirectoryApiKeyProvider, DynamicApiKeyProvider, EnvApiKeyProvider,
};
pub use bucket::{BucketManager, CreateBucketOptions};
pub use client::BucketClient;
pub use config::Config;
pub use encryption::PayloadEncryptor;
pub use error::{Error, Result};
pub use file::FileManager;
pub use logging::{
    LogLevel, Logger, NoopLogger, RemoteLogger, ReportGuard, ReportPermit, TracingLogger,
};
pub use report::{ErrorManager, ErrorReport, LogManager};
pub use request::{MultipartPart, PartContent, RequestBody, RequestSpec, ResponseEnvelope};
pub use sdk::{BucketSdk, FatalReporter};
pub use types::{FileRecord, LinkEntry, Paginated, UploadOptions};

// HTTP method type used throughout the request API
pub use reqwest::Method;
