// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Domain failures (§7.1) and programming failures (§7.2).
//!
//! A [`Failure`] is not an error in the `std::error::Error` sense: it is an
//! expected output of the validator chain, carrying the exact status code,
//! body and headers the real service would send. It short-circuits the
//! chain and is never logged as an error.

use std::collections::HashMap;

use crate::constants::ResultCode;

/// A validator's typed short-circuit response.
#[derive(Debug, Clone)]
pub struct Failure {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl Failure {
    /// Build a failure whose body is the canonical `{"result_code": ..., "transaction_id": ...}`
    /// JSON shape used by almost every VWS/VWQ error response.
    pub fn json_result(status: u16, result_code: ResultCode) -> Self {
        let transaction_id = crate::ids::new_hex_id();
        let body = serde_json::json!({
            "transaction_id": transaction_id,
            "result_code": result_code.as_str(),
        });
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status,
            body: serde_json::to_vec(&body).unwrap_or_default(),
            headers,
        }
    }

    /// Build a failure with an empty body (e.g. `ContentLengthHeaderNotInt`,
    /// which the real service answers with a bare 400 and a closed connection).
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            headers: HashMap::new(),
        }
    }

    /// Build a failure with a raw body and explicit content type.
    pub fn with_body(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        Self {
            status,
            body,
            headers,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

/// Internal failures: invariant violations, unreachable branches, panics
/// caught at the top of the service stack. Surfaced as 500s with the canned
/// HTML body and logged, per spec §7.2; never part of the validator chain.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}

/// Errors raised while resolving a request's authorization header (§4.3).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    HeaderMissing,
    #[error("malformed authorization header")]
    Malformed,
    #[error("authentication failure")]
    Failure,
}

/// Errors raised by [`crate::store::Store`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown database: {0}")]
    UnknownDatabase(String),
    #[error("unknown target: {0}")]
    UnknownTarget(String),
    #[error("duplicate credential: {0}")]
    DuplicateCredential(String),
    #[error("duplicate target name in database: {0}")]
    DuplicateName(String),
}
