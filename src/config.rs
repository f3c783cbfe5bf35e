use crate::auth::Credentials;
use crate::client::{ObjectStoreClient, Scheme};
use crate::transport::ReqwestTransport;
use crate::types::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Connection settings for an object store, as read from a JSON file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
    /// Talk plain HTTP instead of HTTPS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Layer `overrides` on top of `self`; values set in `overrides` win
    pub fn merge(self, overrides: Config) -> Config {
        Config {
            hostname: overrides.hostname.or(self.hostname),
            region: overrides.region.or(self.region),
            access_key_id: overrides.access_key_id.or(self.access_key_id),
            secret_access_key: overrides.secret_access_key.or(self.secret_access_key),
            insecure: overrides.insecure.or(self.insecure),
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ClientError> {
        let hostname = required(&self.hostname, "hostname")?;
        let access_key_id = required(&self.access_key_id, "access_key_id")?;
        let secret_access_key = required(&self.secret_access_key, "secret_access_key")?;

        let mut credentials = Credentials::new(access_key_id, secret_access_key, hostname);
        if let Some(region) = &self.region {
            credentials = credentials.with_region(region);
        }
        Ok(credentials)
    }

    /// Build a client talking to the configured store over `reqwest`
    pub fn build_client(&self) -> Result<ObjectStoreClient, ClientError> {
        let credentials = self.credentials()?;
        let scheme = if self.insecure.unwrap_or(false) {
            Scheme::Http
        } else {
            Scheme::Https
        };
        Ok(
            ObjectStoreClient::new(Arc::new(credentials), Arc::new(ReqwestTransport::new()))
                .with_scheme(scheme),
        )
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ClientError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ClientError::InvalidArgument(format!("missing {} in configuration", name)))
}
