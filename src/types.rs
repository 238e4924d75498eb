//! Typed payloads exchanged with the bucket service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored file, as returned by upload/info/list endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileRecord {
    /// Owning bucket name
    pub bucket: String,
    /// File identifier
    pub uuid: Uuid,
    /// File name with extension
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// MIME type recorded by the service
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Uploader identifier
    #[serde(default)]
    pub owner_uid: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A page of results from a listing endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Current page, 1-based
    #[serde(default)]
    pub page: u32,
    /// Page size
    #[serde(rename = "perPage", default)]
    pub per_page: u32,
    /// Total number of pages
    #[serde(rename = "pageCount", default)]
    pub page_count: u32,
    /// Total number of items
    #[serde(default)]
    pub total: u64,
}

/// Outcome of a bulk link generation request for one file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Download URL, when generation succeeded
    #[serde(default)]
    pub url: Option<String>,
    /// Failure reason, when it did not
    #[serde(default)]
    pub error: Option<String>,
}

/// Options for [`crate::FileManager::upload`]
#[derive(Clone, Debug, Default)]
pub struct UploadOptions {
    /// Subpath inside the bucket
    pub path: Option<String>,
    /// Custom filename with extension
    pub name: Option<String>,
    /// Whether the service should encrypt the file at rest
    pub encrypt: bool,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypt = true;
        self
    }
}
