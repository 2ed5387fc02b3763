#![doc = "S3 integration for the CLI: implements the core `ObjectLister` trait on top of `aws-sdk-s3`."]
//
//! # S3 Lister (CLI <-> Core)
//!
//! This module bridges the listing abstraction in [`autoindex_core::contract`] to the real
//! `ListObjectsV2` API. Credentials come from the standard AWS chain (environment, profile,
//! instance metadata); the region is fixed by configuration.
//!
//! - Construct [`S3Lister`] with [`S3Lister::new_from_env`].
//! - Hand it to [`autoindex_core::autoindex::generate`], which drives pagination.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use chrono::DateTime;

use autoindex_core::contract::{
    ListError, ListObjectsPage, ListObjectsRequest, ObjectLister, RawObject,
};

pub struct S3Lister {
    client: Client,
}

impl S3Lister {
    pub async fn new_from_env(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        tracing::info!(region, "Initialized S3 client from environment");
        Self {
            client: Client::new(&config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_raw_object(object: aws_sdk_s3::types::Object) -> RawObject {
    RawObject {
        key: object.key,
        size: object.size.and_then(|size| u64::try_from(size).ok()),
        last_modified: object
            .last_modified
            .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
    }
}

#[async_trait]
impl ObjectLister for S3Lister {
    async fn list_objects_page(
        &self,
        request: ListObjectsRequest,
    ) -> Result<ListObjectsPage, ListError> {
        let mut req = self.client.list_objects_v2().bucket(&request.bucket);
        if let Some(token) = &request.continuation_token {
            req = req.continuation_token(token);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::error!(
                bucket = %request.bucket,
                error = %DisplayErrorContext(&e),
                "S3 ListObjectsV2 failed"
            );
            ListError::from(format!(
                "S3 ListObjectsV2 failed: {}",
                DisplayErrorContext(&e)
            ))
        })?;

        let contents: Vec<RawObject> = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .map(to_raw_object)
            .collect();

        Ok(ListObjectsPage {
            contents,
            next_continuation_token: resp.next_continuation_token,
            is_truncated: resp.is_truncated.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::primitives::DateTime as SmithyDateTime;
    use aws_sdk_s3::types::Object;

    #[test]
    fn converts_sdk_objects() {
        let object = Object::builder()
            .key("docs/cv.pdf")
            .size(2048)
            .last_modified(SmithyDateTime::from_secs(1_614_870_420))
            .build();

        let raw = to_raw_object(object);

        assert_eq!(raw.key.as_deref(), Some("docs/cv.pdf"));
        assert_eq!(raw.size, Some(2048));
        assert_eq!(raw.last_modified.unwrap().timestamp(), 1_614_870_420);
    }

    #[test]
    fn missing_metadata_stays_missing() {
        let raw = to_raw_object(Object::builder().key("a/").build());

        assert_eq!(raw.size, None);
        assert_eq!(raw.last_modified, None);
    }
}
