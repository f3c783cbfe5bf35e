use super::ObjectStoreClient;
use crate::types::error::{ClientError, Result};
use crate::types::models::{Item, parse_list_bucket_result};
use http::{Method, StatusCode};

impl ObjectStoreClient {
    /// List up to `max_keys` items of `bucket`, starting at `start_key`
    /// (the S3 `marker`). Keys come back in lexicographic order.
    ///
    /// Pages are fetched one after another, each resuming after the last key
    /// seen. The store may repeat that key at the head of the next page; the
    /// repeat is dropped. A key sorting before `start_key` or before the key
    /// preceding it fails the whole call with `ProtocolViolation`, discarding
    /// what was collected so far.
    ///
    /// Never returns more than `max_keys` items. When exactly `max_keys` come
    /// back there is no telling whether the bucket holds more: list again from
    /// the last key returned to find out.
    pub async fn list_objects(
        &self,
        bucket: &str,
        start_key: &str,
        max_keys: i32,
    ) -> Result<Vec<Item>> {
        let max_keys = usize::try_from(max_keys).map_err(|_| {
            ClientError::InvalidArgument(format!("negative max_keys: {}", max_keys))
        })?;

        let mut items: Vec<Item> = Vec::new();
        let mut marker = start_key.to_string();

        while items.len() < max_keys {
            let fetch = (max_keys - items.len()).min(self.page_cap);
            tracing::debug!(
                "Listing objects: bucket={}, marker={:?}, max-keys={}",
                bucket,
                marker,
                fetch
            );

            let mut url = self.bucket_url(bucket)?;
            url.set_query(Some(&format!(
                "marker={}&max-keys={}",
                urlencoding::encode(&marker),
                fetch
            )));

            let response = self.send(self.new_request(Method::GET, url)).await?;
            if response.status != StatusCode::OK {
                return Err(response.into_status_error().await);
            }
            let body = response.bytes().await?;
            let page = parse_list_bucket_result(&body)?;

            let before = items.len();
            for item in page.contents {
                if item.key == marker && !items.is_empty() {
                    // Continuation pages start with the previous page's last key
                    continue;
                }
                if item.key < marker {
                    return Err(ClientError::ProtocolViolation(format!(
                        "listing of {} returned key {:?} after {:?}",
                        bucket, item.key, marker
                    )));
                }
                marker.clone_from(&item.key);
                items.push(item);
                if items.len() == max_keys {
                    break;
                }
            }

            if !page.is_truncated {
                break;
            }
            if items.len() == before {
                return Err(ClientError::ProtocolViolation(format!(
                    "listing of {} is truncated after {:?} but returned no further keys",
                    bucket, marker
                )));
            }
            tracing::trace!("Listing truncated, {} items so far", items.len());
        }

        Ok(items)
    }
}
