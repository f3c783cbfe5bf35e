use super::{TEST_ACCESS_KEY_ID, TEST_BUCKETS, TEST_HOST};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use quick_xml::se::to_string as to_xml_string;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// A request as the fake store received it
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub host: String,
    pub path_and_query: String,
    pub headers: HeaderMap,
}

/// In-memory S3-style store with virtual-hosted buckets.
///
/// Listings treat the marker inclusively: when the marker key exists it is
/// echoed as the first entry, followed by up to `max-keys` later keys.
pub struct FakeStore {
    page_cap: usize,
    buckets: BTreeMap<String, String>,
    objects: Mutex<BTreeMap<(String, String), Bytes>>,
    requests: Mutex<Vec<SeenRequest>>,
}

#[derive(Serialize)]
#[serde(rename = "Error")]
struct S3ErrorResponse {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Serialize)]
#[serde(rename = "ListAllMyBucketsResult")]
struct ListAllMyBucketsResult {
    #[serde(rename = "Buckets")]
    buckets: BucketList,
}

#[derive(Serialize)]
struct BucketList {
    #[serde(rename = "Bucket")]
    bucket: Vec<BucketEntry>,
}

#[derive(Serialize)]
struct BucketEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CreationDate")]
    creation_date: String,
}

#[derive(Serialize)]
#[serde(rename = "ListBucketResult")]
struct ListBucketResult {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Marker")]
    marker: String,
    #[serde(rename = "MaxKeys")]
    max_keys: usize,
    #[serde(rename = "IsTruncated")]
    is_truncated: bool,
    #[serde(rename = "Contents")]
    contents: Vec<S3Object>,
}

#[derive(Serialize)]
struct S3Object {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Size")]
    size: usize,
    #[serde(rename = "StorageClass")]
    storage_class: String,
}

fn xml_response(status: StatusCode, xml: String) -> Response {
    let body = format!(r#"<?xml version="1.0" encoding="UTF-8"?>{}"#, xml);
    (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let xml = to_xml_string(&S3ErrorResponse {
        code: code.to_string(),
        message: message.to_string(),
    })
    .unwrap();
    xml_response(status, xml)
}

fn query_params(uri: &Uri) -> BTreeMap<String, String> {
    uri.query()
        .unwrap_or("")
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (k, v) = p.split_once('=').unwrap_or((p, ""));
            (
                urlencoding::decode(k).unwrap().into_owned(),
                urlencoding::decode(v).unwrap().into_owned(),
            )
        })
        .collect()
}

impl FakeStore {
    pub fn new(page_cap: usize) -> Self {
        let buckets = TEST_BUCKETS
            .iter()
            .map(|name| (name.to_string(), "2024-03-01T12:00:00.000Z".to_string()))
            .collect();
        Self {
            page_cap,
            buckets,
            objects: Mutex::new(BTreeMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, bucket: &str, key: &str, data: &[u8]) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            Bytes::copy_from_slice(data),
        );
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn list_buckets(&self) -> Response {
        let result = ListAllMyBucketsResult {
            buckets: BucketList {
                bucket: self
                    .buckets
                    .iter()
                    .map(|(name, created)| BucketEntry {
                        name: name.clone(),
                        creation_date: created.clone(),
                    })
                    .collect(),
            },
        };
        xml_response(StatusCode::OK, to_xml_string(&result).unwrap())
    }

    fn list_objects(&self, bucket: &str, uri: &Uri) -> Response {
        let params = query_params(uri);
        let marker = params.get("marker").cloned().unwrap_or_default();
        let max_keys: usize = params
            .get("max-keys")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        let objects = self.objects.lock().unwrap();
        let keys: Vec<(&String, usize)> = objects
            .iter()
            .filter(|((b, k), _)| b == bucket && *k >= marker)
            .map(|((_, k), data)| (k, data.len()))
            .collect();

        let echoed = !marker.is_empty() && keys.first().is_some_and(|(k, _)| **k == marker);
        let limit = max_keys.min(self.page_cap) + usize::from(echoed);

        let contents: Vec<S3Object> = keys
            .iter()
            .take(limit)
            .map(|(key, size)| S3Object {
                key: key.to_string(),
                size: *size,
                storage_class: "STANDARD".to_string(),
            })
            .collect();

        let result = ListBucketResult {
            name: bucket.to_string(),
            marker,
            max_keys,
            is_truncated: keys.len() > limit,
            contents,
        };
        xml_response(StatusCode::OK, to_xml_string(&result).unwrap())
    }

    fn put_object(&self, bucket: &str, key: &str, headers: &HeaderMap, body: Bytes) -> Response {
        if let Some(expected) = headers.get("content-md5") {
            use md5::{Digest, Md5};
            let actual = BASE64.encode(Md5::digest(&body));
            if expected.to_str().unwrap_or("") != actual {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "BadDigest",
                    "The Content-MD5 you specified did not match what we received.",
                );
            }
        }
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body);
        StatusCode::OK.into_response()
    }
}

/// Single fallback handler routing on the Host header
pub async fn handle(
    State(store): State<Arc<FakeStore>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    store.requests.lock().unwrap().push(SeenRequest {
        method: method.clone(),
        host: host.clone(),
        path_and_query: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        headers: headers.clone(),
    });

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|auth| {
            auth.starts_with(&format!(
                "AWS4-HMAC-SHA256 Credential={}/",
                TEST_ACCESS_KEY_ID
            ))
        });
    if !authorized {
        return error_response(StatusCode::FORBIDDEN, "AccessDenied", "Access Denied");
    }

    let host_name = host.split(':').next().unwrap_or("");
    if host_name == TEST_HOST {
        return match method {
            Method::GET => store.list_buckets(),
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        };
    }

    let Some(bucket) = host_name.strip_suffix(&format!(".{}", TEST_HOST)) else {
        return error_response(StatusCode::BAD_REQUEST, "InvalidRequest", "Unknown host");
    };
    if !store.buckets.contains_key(bucket) {
        return error_response(
            StatusCode::NOT_FOUND,
            "NoSuchBucket",
            "The specified bucket does not exist.",
        );
    }

    let key = urlencoding::decode(uri.path().trim_start_matches('/'))
        .unwrap()
        .into_owned();

    if key.is_empty() {
        return match method {
            Method::GET => store.list_objects(bucket, &uri),
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        };
    }

    match method {
        Method::PUT => store.put_object(bucket, &key, &headers, body),
        Method::HEAD => match store.get(bucket, &key) {
            Some(data) => (
                StatusCode::OK,
                [(header::CONTENT_LENGTH, data.len().to_string())],
            )
                .into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        Method::GET => match store.get(bucket, &key) {
            Some(data) => (StatusCode::OK, data).into_response(),
            None => error_response(
                StatusCode::NOT_FOUND,
                "NoSuchKey",
                "The specified key does not exist.",
            ),
        },
        Method::DELETE => {
            let removed = store
                .objects
                .lock()
                .unwrap()
                .remove(&(bucket.to_string(), key));
            match removed {
                Some(_) => StatusCode::NO_CONTENT.into_response(),
                None => error_response(
                    StatusCode::NOT_FOUND,
                    "NoSuchKey",
                    "The specified key does not exist.",
                ),
            }
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}
