// Library exports for the CLI and integration tests
pub mod auth;
pub mod client;
pub mod config;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use auth::{Credentials, SignRequest};
pub use client::{ObjectDownload, ObjectStoreClient, PAGE_CAP, Scheme, content_md5};
pub use config::Config;
pub use transport::{
    HttpRequest, HttpResponse, ObjectStream, ReqwestTransport, Transport, UploadStream,
    upload_stream_from,
};
pub use types::{Bucket, ClientError, Item, Result};
