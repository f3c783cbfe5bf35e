mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

use crate::types::error::{ClientError, MAX_ERROR_BODY, Result};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use http::{HeaderMap, Method, StatusCode, header};
use std::fmt;
use std::pin::Pin;
use url::Url;

/// Response body handed to callers; consumed lazily
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Request body for uploads
pub type UploadStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send + Sync>>;

/// Wrap an in-memory buffer as an upload body
pub fn upload_stream_from(data: impl Into<Bytes>) -> UploadStream {
    let data: Bytes = data.into();
    Box::pin(stream::iter(std::iter::once(Ok::<_, ClientError>(data))))
}

/// Outgoing request, signed by a `SignRequest` and executed by a `Transport`
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<UploadStream>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Value of the `Host` header for this request's URL
    pub fn host(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ObjectStream,
}

impl HttpResponse {
    /// Buffer the whole body
    pub async fn bytes(self) -> Result<Bytes> {
        let mut body = self.body;
        let mut data = BytesMut::new();
        while let Some(chunk) = body.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data.freeze())
    }

    /// Best-effort drain of an error response body for diagnostics.
    ///
    /// Keeps at most `MAX_ERROR_BODY` bytes; read failures end the capture.
    pub async fn capture_body(self) -> String {
        let mut body = self.body;
        let mut data = Vec::new();
        while let Some(Ok(chunk)) = body.next().await {
            let room = MAX_ERROR_BODY - data.len();
            data.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if data.len() == MAX_ERROR_BODY {
                break;
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    /// Turn this response into an `UnexpectedStatus` error, capturing its body
    pub async fn into_status_error(self) -> ClientError {
        let status = self.status.as_u16();
        let body = self.capture_body().await;
        ClientError::unexpected_status(status, body)
    }

    /// Declared `Content-Length`, `None` when the header is absent
    pub fn content_length(&self) -> Result<Option<u64>> {
        let Some(value) = self.headers.get(header::CONTENT_LENGTH) else {
            return Ok(None);
        };
        value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Some)
            .ok_or_else(|| {
                ClientError::MalformedResponse(format!("invalid Content-Length: {:?}", value))
            })
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// HTTP transport capability.
///
/// Implementations must be safe to share between concurrent callers.
/// Timeouts and retries are the transport's business; the client adds none.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}
