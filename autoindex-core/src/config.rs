use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::classify::{ClassifyOptions, UrlOptions};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_SITE_PREFIX: &str = "/files";
pub const DEFAULT_INDEX_FILE_NAME: &str = "index.pug";

/// Everything a single autoindex run needs to know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoindexConfig {
    /// Directory that receives one index document per bucket directory.
    pub base_dir: PathBuf,
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// IANA name of the timezone used to display modification times.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Prefix for public object URLs. Defaults to the bucket's virtual-hosted S3 endpoint.
    #[serde(default)]
    pub public_url_base: Option<String>,
    /// Site-relative prefix under which directory listings are served.
    #[serde(default = "default_site_prefix")]
    pub site_prefix: String,
    #[serde(default = "default_index_file_name")]
    pub index_file_name: String,
    /// Page template on disk. The built-in template is used when absent.
    #[serde(default)]
    pub template: Option<PathBuf>,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_site_prefix() -> String {
    DEFAULT_SITE_PREFIX.to_string()
}

fn default_index_file_name() -> String {
    DEFAULT_INDEX_FILE_NAME.to_string()
}

impl AutoindexConfig {
    pub fn new(base_dir: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            bucket: bucket.into(),
            region: default_region(),
            timezone: default_timezone(),
            public_url_base: None,
            site_prefix: default_site_prefix(),
            index_file_name: default_index_file_name(),
            template: None,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            base_dir = %self.base_dir.display(),
            bucket = %self.bucket,
            region = %self.region,
            timezone = %self.timezone,
            "Loaded AutoindexConfig"
        );
        debug!(?self, "AutoindexConfig loaded (full debug)");
    }

    /// Public URL prefix for objects, without a trailing slash.
    pub fn public_url_base(&self) -> String {
        match &self.public_url_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}.s3.amazonaws.com", self.bucket),
        }
    }

    /// Parse the configured timezone name.
    pub fn display_timezone(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("unknown timezone `{}`: {e}", self.timezone))
    }

    pub fn classify_options(&self) -> Result<ClassifyOptions, String> {
        Ok(ClassifyOptions {
            timezone: self.display_timezone()?,
        })
    }

    pub fn url_options(&self) -> UrlOptions {
        UrlOptions {
            public_url_base: self.public_url_base(),
            site_prefix: self.site_prefix.trim_end_matches('/').to_string(),
        }
    }
}
