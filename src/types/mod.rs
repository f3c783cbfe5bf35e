pub mod error;
pub mod models;

pub use error::{ClientError, Result};
pub use models::{Bucket, Item, ListBucketResult};
