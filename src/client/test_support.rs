use super::{ObjectStoreClient, Scheme};
use crate::auth::Credentials;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::types::error::{ClientError, Result};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use url::Url;

/// A request as seen by the scripted transport, body buffered
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

enum Scripted {
    Respond {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },
    Fail(String),
}

/// Transport that replays canned responses in order and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.respond_with_headers(status, &[], body)
    }

    pub fn respond_with_headers(&self, status: u16, headers: &[(&str, &str)], body: &str) -> &Self {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            header_map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        self.script.lock().unwrap().push_back(Scripted::Respond {
            status: StatusCode::from_u16(status).unwrap(),
            headers: header_map,
            body: Bytes::copy_from_slice(body.as_bytes()),
        });
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let body = match request.body {
            Some(mut stream) => {
                let mut data = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    data.extend_from_slice(&chunk?);
                }
                Some(data.freeze())
            }
            None => None,
        };

        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body,
        });

        let next = self.script.lock().unwrap().pop_front();
        match next.expect("unexpected request: nothing scripted") {
            Scripted::Respond {
                status,
                headers,
                body,
            } => Ok(HttpResponse {
                status,
                headers,
                body: Box::pin(stream::iter(std::iter::once(Ok::<_, ClientError>(body)))),
            }),
            Scripted::Fail(message) => Err(ClientError::transport(message)),
        }
    }
}

pub fn test_client(transport: Arc<ScriptedTransport>) -> ObjectStoreClient {
    let credentials = Credentials::new("AKIDTEST", "secret", "s3.test:9000");
    ObjectStoreClient::new(Arc::new(credentials), transport).with_scheme(Scheme::Http)
}

/// Render one listing page the way the store sends it
pub fn listing_page(keys: &[&str], truncated: bool) -> String {
    let contents: String = keys
        .iter()
        .map(|key| format!("<Contents><Key>{}</Key><Size>{}</Size></Contents>", key, key.len()))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><ListBucketResult><IsTruncated>{}</IsTruncated>{}</ListBucketResult>"#,
        truncated, contents
    )
}
