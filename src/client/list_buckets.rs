use super::ObjectStoreClient;
use crate::types::models::{Bucket, parse_list_all_my_buckets};
use crate::types::error::Result;
use http::{Method, StatusCode};

impl ObjectStoreClient {
    /// GET Service: enumerate every bucket owned by the credential
    pub async fn list_all_buckets(&self) -> Result<Vec<Bucket>> {
        tracing::debug!("Listing buckets on {}", self.hostname());

        let url = self.service_url()?;
        let response = self.send(self.new_request(Method::GET, url)).await?;

        if response.status != StatusCode::OK {
            return Err(response.into_status_error().await);
        }

        let body = response.bytes().await?;
        let buckets = parse_list_all_my_buckets(&body)?;
        tracing::debug!("Found {} buckets", buckets.len());
        Ok(buckets)
    }
}
