use super::signature::sign_v4;
use crate::transport::HttpRequest;
use crate::types::error::Result;
use chrono::{DateTime, Utc};
use std::fmt;

/// Region used for signing when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Credential capability: authenticates outgoing requests and names the store host
pub trait SignRequest: Send + Sync {
    /// Add authentication material (headers or query parameters) to `request`
    fn sign(&self, request: &mut HttpRequest) -> Result<()>;

    /// Hostname of the store, optionally with a port (`s3.amazonaws.com`, `localhost:9000`)
    fn hostname(&self) -> &str;
}

/// Static access key pair for an S3-compatible store, signing with SigV4
#[derive(Clone)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    hostname: String,
    region: String,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            hostname: hostname.into(),
            region: DEFAULT_REGION.to_string(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Sign as of `now` instead of the current time
    pub fn sign_at(&self, request: &mut HttpRequest, now: DateTime<Utc>) -> Result<()> {
        sign_v4(
            request,
            &self.access_key_id,
            &self.secret_access_key,
            &self.region,
            now,
        )
    }
}

impl SignRequest for Credentials {
    fn sign(&self, request: &mut HttpRequest) -> Result<()> {
        self.sign_at(request, Utc::now())
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("hostname", &self.hostname)
            .field("region", &self.region)
            .finish()
    }
}
