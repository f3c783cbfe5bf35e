use serde::Deserialize;

/// Upper bound on how much of an error response body is kept for diagnostics
pub const MAX_ERROR_BODY: usize = 64 * 1024;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by the object store client
///
/// A missing object is not an error: `stat_object` and `get_object` report it
/// as `Ok(None)` so callers have to branch on it explicitly.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A caller-supplied argument was rejected before any request was sent
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store answered with a status outside the operation's accepted set
    #[error("unexpected status {status} from object store: {body}")]
    UnexpectedStatus {
        status: u16,
        code: Option<String>,
        body: String,
    },

    /// A 200 response whose body or headers could not be decoded
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The store returned data that breaks the listing contract
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to sign request: {0}")]
    Signing(String),
}

/// S3 XML error document, e.g. `<Error><Code>NoSuchBucket</Code>...</Error>`
#[derive(Debug, Deserialize)]
#[serde(rename = "Error")]
struct S3ErrorDocument {
    #[serde(rename = "Code")]
    code: String,
}

impl ClientError {
    /// Build an `UnexpectedStatus` error from a captured response body,
    /// pulling out the S3 error code when the body is an S3 error document.
    pub fn unexpected_status(status: u16, body: String) -> Self {
        let code = quick_xml::de::from_str::<S3ErrorDocument>(&body)
            .ok()
            .map(|doc| doc.code);
        ClientError::UnexpectedStatus { status, code, body }
    }

    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ClientError::Transport(err.into())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// S3 error code (`NoSuchBucket`, `BadDigest`, ...) carried by the error, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::UnexpectedStatus { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
