//! Trait seams of the autoindex pipeline.
//!
//! The pipeline never talks to a storage backend or a template engine directly. It goes
//! through the two traits below so that the CLI can plug in the real S3 client and the
//! mustache renderer, while tests plug in `mockall` mocks or in-memory fakes.
//!
//! - [`ObjectLister`]: one page of a bucket listing per call.
//! - [`PageRenderer`]: turns one row or one page context into markup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use serde::Serialize;

/// Error returned by storage backends at the trait seam.
pub type ListError = Box<dyn std::error::Error + Send + Sync>;

/// An entry as returned by the storage backend, before any formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawObject {
    /// Object key, `/`-delimited. A well-behaved backend always sets it.
    pub key: Option<String>,
    /// Byte count. Absent for pseudo-directory markers.
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl RawObject {
    pub fn new(key: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            key: Some(key.into()),
            size,
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}

/// Request for a single page of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObjectsRequest {
    pub bucket: String,
    /// Cursor returned by the previous page, `None` for the first request.
    pub continuation_token: Option<String>,
}

/// One page of a bucket listing.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsPage {
    pub contents: Vec<RawObject>,
    pub next_continuation_token: Option<String>,
    pub is_truncated: bool,
}

/// Paginated access to the objects of a bucket.
///
/// Implemented by the S3 client in the `autoindex` binary and by mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectLister: Send + Sync {
    /// Fetch one page of objects, starting after `request.continuation_token`.
    async fn list_objects_page(
        &self,
        request: ListObjectsRequest,
    ) -> Result<ListObjectsPage, ListError>;
}

/// Data handed to the renderer for one listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowContext {
    /// Rotating style index, always in `1..=4`.
    pub idx: usize,
    /// Icon name: `dir` or `file`.
    pub icon: &'static str,
    pub url: String,
    pub name: String,
    pub size: String,
    pub last_modified: String,
}

/// Data handed to the renderer for one listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    /// Site path of the listed directory, always starting with `/`.
    pub dir_level: String,
    pub back_label: String,
    /// Pre-rendered rows, inserted verbatim.
    pub rendered_list: String,
}

/// Error type for [`PageRenderer`] implementations.
pub type TemplateError = Box<dyn std::error::Error + Send + Sync>;

/// Template engine used by the listing writer.
///
/// Output is trusted markup: implementations must not escape the values.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait PageRenderer: Send + Sync {
    fn render_row(&self, row: &RowContext) -> Result<String, TemplateError>;

    fn render_page(&self, page: &PageContext) -> Result<String, TemplateError>;
}
