use super::ObjectStoreClient;
use crate::types::error::Result;
use http::{Method, StatusCode};

impl ObjectStoreClient {
    /// DELETE an object. Deleting a key that does not exist succeeds.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        tracing::debug!("Deleting object: bucket={}, key={}", bucket, key);

        let url = self.object_url(bucket, key)?;
        let response = self.send(self.new_request(Method::DELETE, url)).await?;

        match response.status {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(response.into_status_error().await),
        }
    }
}
