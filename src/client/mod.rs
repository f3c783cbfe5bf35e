use crate::auth::SignRequest;
use crate::transport::{HttpRequest, HttpResponse, Transport};
use crate::types::error::{ClientError, Result};
use http::{HeaderValue, Method, header};
use std::sync::Arc;
use url::Url;

mod delete_object;
mod get_object;
mod list_buckets;
mod list_objects;
mod put_object;
mod stat_object;
#[cfg(test)]
mod test_support;

pub use get_object::ObjectDownload;
pub use put_object::content_md5;

/// Maximum number of keys the store returns per listing request
pub const PAGE_CAP: usize = 1000;

const USER_AGENT: &str = concat!("s3client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Client for an S3-compatible object store using virtual-hosted addressing
/// (`{bucket}.{hostname}/{key}`).
///
/// Holds no per-call state; clone it or share it between tasks freely.
#[derive(Clone)]
pub struct ObjectStoreClient {
    credentials: Arc<dyn SignRequest>,
    transport: Arc<dyn Transport>,
    scheme: Scheme,
    page_cap: usize,
}

impl ObjectStoreClient {
    pub fn new(credentials: Arc<dyn SignRequest>, transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials,
            transport,
            scheme: Scheme::default(),
            page_cap: PAGE_CAP,
        }
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Lower the number of keys requested per listing page (clamped to `1..=PAGE_CAP`)
    pub fn with_page_cap(mut self, page_cap: usize) -> Self {
        self.page_cap = page_cap.clamp(1, PAGE_CAP);
        self
    }

    pub fn hostname(&self) -> &str {
        self.credentials.hostname()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    fn service_url(&self) -> Result<Url> {
        parse_url(&format!("{}://{}/", self.scheme.as_str(), self.hostname()))
    }

    fn bucket_url(&self, bucket: &str) -> Result<Url> {
        validate_bucket(bucket)?;
        parse_url(&format!(
            "{}://{}.{}/",
            self.scheme.as_str(),
            bucket,
            self.hostname()
        ))
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<Url> {
        validate_bucket(bucket)?;
        let path = encode_key(key)?;
        parse_url(&format!(
            "{}://{}.{}/{}",
            self.scheme.as_str(),
            bucket,
            self.hostname(),
            path
        ))
    }

    fn new_request(&self, method: Method, url: Url) -> HttpRequest {
        let mut request = HttpRequest::new(method, url);
        request
            .headers
            .insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        request
    }

    /// Sign and execute a request
    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        self.credentials.sign(&mut request)?;
        self.transport.execute(request).await
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| ClientError::InvalidArgument(format!("invalid URL {}: {}", raw, e)))
}

fn validate_bucket(bucket: &str) -> Result<()> {
    let valid = !bucket.is_empty()
        && bucket
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
    if !valid {
        return Err(ClientError::InvalidArgument(format!(
            "invalid bucket name {:?}",
            bucket
        )));
    }
    Ok(())
}

/// Percent-encode each path segment of an object key, keeping `/` separators.
///
/// `.` and `..` segments are rejected: URL normalization would rewrite them
/// and the request would address a different key.
fn encode_key(key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(ClientError::InvalidArgument("empty object key".to_string()));
    }
    let mut segments = Vec::new();
    for segment in key.split('/') {
        if segment == "." || segment == ".." {
            return Err(ClientError::InvalidArgument(format!(
                "object key {:?} contains a relative path segment",
                key
            )));
        }
        segments.push(urlencoding::encode(segment).into_owned());
    }
    Ok(segments.join("/"))
}
