mod credentials;
mod signature;

pub use credentials::{Credentials, DEFAULT_REGION, SignRequest};
pub use signature::{EMPTY_PAYLOAD_SHA256, UNSIGNED_PAYLOAD, sign_v4};
