use tracing::{debug, info, warn};

use crate::contract::{ListError, ListObjectsRequest, ObjectLister, RawObject};

/// Collect every object of `bucket`, following continuation tokens until the backend
/// reports the listing is complete. Pages are requested one after the other and their
/// contents are kept in order.
pub async fn list_all_objects<L>(lister: &L, bucket: &str) -> Result<Vec<RawObject>, ListError>
where
    L: ObjectLister + ?Sized,
{
    let mut objects = Vec::new();
    let mut continuation_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let request = ListObjectsRequest {
            bucket: bucket.to_string(),
            continuation_token: continuation_token.take(),
        };
        let page = lister.list_objects_page(request).await?;
        pages += 1;
        debug!(
            bucket,
            page = pages,
            objects = page.contents.len(),
            is_truncated = page.is_truncated,
            "Fetched listing page"
        );

        objects.extend(page.contents);

        if !page.is_truncated {
            break;
        }
        match page.next_continuation_token {
            Some(token) => continuation_token = Some(token),
            None => {
                warn!(bucket, page = pages, "Truncated listing without continuation token, stopping");
                break;
            }
        }
    }

    info!(bucket, pages, objects = objects.len(), "Listed bucket");
    Ok(objects)
}
