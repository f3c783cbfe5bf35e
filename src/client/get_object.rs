use super::ObjectStoreClient;
use crate::transport::ObjectStream;
use crate::types::error::Result;
use bytes::{Bytes, BytesMut};
use futures::stream::StreamExt;
use http::{Method, StatusCode};
use std::fmt;

/// An object body being downloaded.
///
/// The body is read lazily from the open connection; the caller owns it and
/// must read it to the end or drop it.
pub struct ObjectDownload {
    pub body: ObjectStream,
    /// `Content-Length` declared by the store, if any
    pub size: Option<u64>,
}

impl ObjectDownload {
    /// Read the rest of the body into memory
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut data = BytesMut::with_capacity(self.size.unwrap_or(0).min(1 << 20) as usize);
        while let Some(chunk) = self.body.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data.freeze())
    }
}

impl fmt::Debug for ObjectDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDownload")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl ObjectStoreClient {
    /// GET an object, or `None` if the store reports 404
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectDownload>> {
        tracing::debug!("Getting object: bucket={}, key={}", bucket, key);

        let url = self.object_url(bucket, key)?;
        let response = self.send(self.new_request(Method::GET, url)).await?;

        match response.status {
            StatusCode::OK => {
                let size = response.content_length()?;
                Ok(Some(ObjectDownload {
                    body: response.body,
                    size,
                }))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(response.into_status_error().await),
        }
    }
}
