use super::error::{ClientError, Result};
use serde::Deserialize;

/// A bucket as reported by the service-level bucket enumeration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bucket {
    #[serde(rename = "Name")]
    pub name: String,
    /// As sent by the store, e.g. `2006-02-03T16:45:09.000Z`
    #[serde(rename = "CreationDate")]
    pub creation_date: String,
}

impl Bucket {
    /// Parsed creation timestamp, if the store sent a valid RFC 3339 value
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(&self.creation_date)
            .ok()
            .map(|dt| dt.with_timezone(&chrono::Utc))
    }
}

/// A single key returned by a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Item {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Size")]
    pub size: u64,
}

/// S3 XML response for GET Service
#[derive(Debug, Deserialize)]
#[serde(rename = "ListAllMyBucketsResult")]
struct ListAllMyBucketsResult {
    #[serde(rename = "Buckets")]
    buckets: BucketList,
}

#[derive(Debug, Deserialize)]
struct BucketList {
    #[serde(rename = "Bucket", default)]
    bucket: Vec<Bucket>,
}

/// One page of a GET Bucket (ListObjects v1) response.
///
/// `IsTruncated` is required: any other document, an `<Error>` body
/// included, would otherwise read as a complete empty listing.
#[derive(Debug, Deserialize)]
#[serde(rename = "ListBucketResult")]
pub struct ListBucketResult {
    #[serde(rename = "Contents", default)]
    pub contents: Vec<Item>,
    #[serde(rename = "IsTruncated")]
    pub is_truncated: bool,
}

/// Decode a bucket enumeration response body.
///
/// A document without the `Buckets` envelope is rejected rather than read as
/// an empty list.
pub fn parse_list_all_my_buckets(body: &[u8]) -> Result<Vec<Bucket>> {
    let result: ListAllMyBucketsResult = quick_xml::de::from_reader(body)
        .map_err(|e| ClientError::MalformedResponse(format!("bucket list: {}", e)))?;
    Ok(result.buckets.bucket)
}

/// Decode one listing page
pub fn parse_list_bucket_result(body: &[u8]) -> Result<ListBucketResult> {
    quick_xml::de::from_reader(body)
        .map_err(|e| ClientError::MalformedResponse(format!("object listing: {}", e)))
}
