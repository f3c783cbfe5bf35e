use crate::transport::HttpRequest;
use crate::types::error::{ClientError, Result};
use chrono::{DateTime, Utc};
use http::HeaderMap;
use http::header::{self, HeaderName, HeaderValue};

/// Payload hash sent for streamed uploads
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// SHA-256 of the empty string, the payload hash of body-less requests
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Sign a request in place with AWS Signature Version 4
///
/// This function:
/// 1. Sets the Host, x-amz-date and x-amz-content-sha256 headers
/// 2. Builds the canonical request over Host, Content-MD5 and x-amz-* headers
/// 3. Creates the string to sign for `date/region/s3/aws4_request`
/// 4. Derives the signing key and calculates the signature
/// 5. Sets the Authorization header
pub fn sign_v4(
    request: &mut HttpRequest,
    access_key_id: &str,
    secret_access_key: &str,
    region: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = &amz_date[..8];

    let payload_hash = if request.body.is_some() {
        UNSIGNED_PAYLOAD
    } else {
        EMPTY_PAYLOAD_SHA256
    };

    let host = request.host();
    set_header(&mut request.headers, header::HOST, &host)?;
    set_header(
        &mut request.headers,
        HeaderName::from_static("x-amz-date"),
        &amz_date,
    )?;
    set_header(
        &mut request.headers,
        HeaderName::from_static("x-amz-content-sha256"),
        payload_hash,
    )?;

    let signed_headers = signed_header_names(&request.headers);
    let canonical_request = build_canonical_request(request, &signed_headers, payload_hash);

    let credential_scope = format!("{}/{}/{}/aws4_request", date, region, SERVICE);
    let string_to_sign = build_string_to_sign(&canonical_request, &amz_date, &credential_scope);

    let signing_key = derive_signing_key(secret_access_key, date, region, SERVICE)?;
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM,
        access_key_id,
        credential_scope,
        signed_headers.join(";"),
        signature
    );
    set_header(&mut request.headers, header::AUTHORIZATION, &authorization)
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| ClientError::Signing(format!("invalid {} header: {}", name, e)))?;
    headers.insert(name, value);
    Ok(())
}

/// Headers covered by the signature, sorted
fn signed_header_names(headers: &HeaderMap) -> Vec<String> {
    let mut names: Vec<String> = headers
        .keys()
        .map(|name| name.as_str())
        .filter(|name| {
            *name == "host"
                || *name == "content-md5"
                || *name == "content-type"
                || name.starts_with("x-amz-")
        })
        .map(|name| name.to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Build the canonical request string
fn build_canonical_request(
    request: &HttpRequest,
    signed_headers: &[String],
    payload_hash: &str,
) -> String {
    let method = request.method.as_str();

    // Object keys are already percent-encoded per segment when the URL is built
    let uri = request.url.path();

    let raw_query = request.url.query().unwrap_or("");
    let canonical_query = canonicalize_query_string(raw_query);

    let canonical_headers = build_canonical_headers(&request.headers, signed_headers);

    // HTTPMethod \n CanonicalURI \n CanonicalQueryString \n
    // CanonicalHeaders \n SignedHeaders \n HashedPayload
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method,
        uri,
        canonical_query,
        canonical_headers,
        signed_headers.join(";"),
        payload_hash
    )
}

/// Canonicalize query string the way SigV4 expects it
/// Parameters must be sorted by name. The query string is built already
/// percent-encoded, so we preserve that encoding and just sort the parameters.
fn canonicalize_query_string(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let mut params: Vec<(&str, &str)> = query
        .split('&')
        .map(|param| param.split_once('=').unwrap_or((param, "")))
        .collect();

    params.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)));

    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

fn build_canonical_headers(headers: &HeaderMap, signed_headers: &[String]) -> String {
    let mut canonical = String::new();

    for header_name in signed_headers {
        if let Some(value) = headers.get(header_name.as_str())
            && let Ok(value_str) = value.to_str()
        {
            canonical.push_str(header_name);
            canonical.push(':');
            canonical.push_str(value_str.trim());
            canonical.push('\n');
        }
    }

    canonical
}

fn build_string_to_sign(canonical_request: &str, amz_date: &str, credential_scope: &str) -> String {
    use sha2::{Digest, Sha256};

    let hashed_canonical_request = hex::encode(Sha256::digest(canonical_request.as_bytes()));

    format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM, amz_date, credential_scope, hashed_canonical_request
    )
}

/// kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")
fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_secret = format!("AWS4{}", secret_key);
    let k_date = hmac_sha256(k_secret.as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ClientError::Signing(format!("HMAC error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
