use super::{HttpRequest, HttpResponse, Transport};
use crate::types::error::{ClientError, Result};
use futures::stream::StreamExt;

/// `Transport` backed by a pooled `reqwest::Client`
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, proxies, DNS overrides, ...)
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::trace!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(reqwest::Body::wrap_stream(body));
        }

        let response = builder.send().await.map_err(ClientError::transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ClientError::transport));

        Ok(HttpResponse {
            status,
            headers,
            body: Box::pin(body),
        })
    }
}
