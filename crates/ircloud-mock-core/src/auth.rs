// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Parses an `Authorization: VWS <access_key>:<signature>` header,
//! recomputes the HMAC-SHA1 signature and resolves a request to the
//! database that issued the matching credential (§4.3).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;

use crate::error::AuthError;
use crate::store::Store;

type HmacSha1 = Hmac<Sha1>;

const AUTH_PREFIX: &str = "VWS ";

/// One inbound request's authorization-relevant fields.
pub struct SignedRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub body: &'a [u8],
    pub content_type: Option<&'a str>,
    pub date_header: &'a str,
    pub authorization_header: Option<&'a str>,
}

/// Builds the canonical signing string (§4.3):
/// `METHOD\nhex(md5(body))\ncontent-type-or-empty\ndate-header\npath`.
pub fn canonical_string(req: &SignedRequest<'_>) -> String {
    let mut hasher = Md5::new();
    hasher.update(req.body);
    let body_md5_hex = hex::encode(hasher.finalize());
    format!(
        "{}\n{}\n{}\n{}\n{}",
        req.method,
        body_md5_hex,
        req.content_type.unwrap_or(""),
        req.date_header,
        req.path,
    )
}

/// Computes the base64 HMAC-SHA1 signature for a canonical string. Exposed
/// so integration tests (and any client wanting to build a valid request by
/// hand) do not need to reimplement the signing scheme.
pub fn sign(secret_key: &str, canonical: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(canonical.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// `VWS <access_key>:<base64_hmac_sha1>`.
struct ParsedHeader<'a> {
    access_key: &'a str,
    signature: &'a str,
}

fn parse_header(header: &str) -> Result<ParsedHeader<'_>, AuthError> {
    let rest = header.strip_prefix(AUTH_PREFIX).ok_or(AuthError::Malformed)?;
    let (access_key, signature) = rest.split_once(':').ok_or(AuthError::Malformed)?;
    if access_key.is_empty() || signature.is_empty() {
        return Err(AuthError::Malformed);
    }
    Ok(ParsedHeader {
        access_key,
        signature,
    })
}

/// Resolves `req` to the database that owns the matching access key,
/// recomputing and comparing the signature. Failure modes are checked in
/// the exact order spec §4.3 defines: header missing, malformed, unknown
/// key, signature mismatch.
pub async fn resolve_database(
    store: &Store,
    req: &SignedRequest<'_>,
    allow_client_key: bool,
) -> Result<String, AuthError> {
    let header = req.authorization_header.ok_or(AuthError::HeaderMissing)?;
    let parsed = parse_header(header)?;
    let matched = store
        .find_by_access_key(parsed.access_key, allow_client_key)
        .await
        .ok_or(AuthError::Failure)?;
    let canonical = canonical_string(req);
    let expected_signature = sign(&matched.secret_key, &canonical);
    if !constant_time_eq(expected_signature.as_bytes(), parsed.signature.as_bytes()) {
        return Err(AuthError::Failure);
    }
    Ok(matched.database_name)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Minimal hex-encoding helper, avoiding a dependency purely for this.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}
