use super::ObjectStoreClient;
use crate::transport::{UploadStream, upload_stream_from};
use crate::types::error::{ClientError, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use http::{HeaderName, HeaderValue, Method, StatusCode, header};

/// Raw MD5 digest of `data`, suitable as the `checksum` of `put_object`
pub fn content_md5(data: &[u8]) -> [u8; 16] {
    use md5::{Digest, Md5};
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&Md5::digest(data));
    digest
}

impl ObjectStoreClient {
    /// PUT an object.
    ///
    /// `body` must yield exactly `content_size` bytes; the length is sent as
    /// `Content-Length` and not checked locally. A `checksum` is the raw MD5
    /// digest of the content and is sent base64-encoded as `Content-MD5` so
    /// the store can reject a corrupted upload.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_size: u64,
        checksum: Option<&[u8]>,
        body: UploadStream,
    ) -> Result<()> {
        tracing::debug!(
            "Putting object: bucket={}, key={}, size={}",
            bucket,
            key,
            content_size
        );

        let url = self.object_url(bucket, key)?;
        let mut request = self.new_request(Method::PUT, url);
        request
            .headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(content_size));

        if let Some(digest) = checksum {
            let encoded = BASE64.encode(digest);
            let value = HeaderValue::from_str(&encoded)
                .map_err(|e| ClientError::InvalidArgument(format!("checksum: {}", e)))?;
            request
                .headers
                .insert(HeaderName::from_static("content-md5"), value);
        }

        request.body = Some(body);

        let response = self.send(request).await?;
        if response.status != StatusCode::OK {
            return Err(response.into_status_error().await);
        }

        tracing::debug!("Stored object: bucket={}, key={}", bucket, key);
        Ok(())
    }

    /// PUT an in-memory object, sending its MD5 as `Content-MD5`
    pub async fn put_object_bytes(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Bytes>,
    ) -> Result<()> {
        let data: Bytes = data.into();
        let digest = content_md5(&data);
        self.put_object(
            bucket,
            key,
            data.len() as u64,
            Some(&digest),
            upload_stream_from(data),
        )
        .await
    }
}
