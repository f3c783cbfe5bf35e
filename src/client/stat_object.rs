use super::ObjectStoreClient;
use crate::types::error::{ClientError, Result};
use http::{Method, StatusCode};

impl ObjectStoreClient {
    /// HEAD an object and return its size, or `None` if the store reports 404
    pub async fn stat_object(&self, bucket: &str, key: &str) -> Result<Option<u64>> {
        tracing::debug!("Stat object: bucket={}, key={}", bucket, key);

        let url = self.object_url(bucket, key)?;
        let response = self.send(self.new_request(Method::HEAD, url)).await?;

        match response.status {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .content_length()?
                .map(Some)
                .ok_or_else(|| {
                    ClientError::MalformedResponse("missing Content-Length on HEAD".to_string())
                }),
            _ => Err(response.into_status_error().await),
        }
    }
}
