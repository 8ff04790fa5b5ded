// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Renders domain values into HTTP responses carrying the wire-protocol
//! header set every response gets (§6): `Server`, a fresh `Date`,
//! `Connection: keep-alive`, and `Content-Length`. `Content-Type` is taken
//! from the domain value itself, since the one documented exception (no
//! `Content-Type` on 415) has to come from the failure, not the renderer.

use std::any::Any;

use axum::body::Body;
use axum::http::{HeaderValue, Response, StatusCode};
use ircloud_mock_core::error::{Failure, InternalError};
use serde::Serialize;
use tracing::error;

fn base_headers(response: &mut Response<Body>) {
    let headers = response.headers_mut();
    headers.insert("server", HeaderValue::from_static("nginx"));
    headers.insert(
        "date",
        HeaderValue::from_str(&httpdate::fmt_http_date(std::time::SystemTime::now()))
            .expect("httpdate output is always valid ASCII"),
    );
    headers.insert("connection", HeaderValue::from_static("keep-alive"));
}

pub fn success_json(status: StatusCode, body: &impl Serialize) -> Response<Body> {
    let bytes = serde_json::to_vec(body).expect("domain success bodies always serialize");
    let mut response = Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .expect("well-formed response parts");
    base_headers(&mut response);
    response
}

pub fn failure(failure: Failure) -> Response<Body> {
    let status = StatusCode::from_u16(failure.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = Response::builder().status(status);
    for (name, value) in &failure.headers {
        builder = builder.header(name, value);
    }
    let mut response = builder
        .body(Body::from(failure.body))
        .expect("well-formed response parts");
    base_headers(&mut response);
    response
}

pub fn internal_error() -> Response<Body> {
    let mut response = Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("content-type", "text/html")
        .body(Body::from(
            "<html><body><h1>Internal Server Error</h1></body></html>",
        ))
        .expect("well-formed response parts");
    base_headers(&mut response);
    response
}

/// Catches panics unwound from any handler or layer in the stack (§7.2):
/// logs the invariant violation and degrades to the same canned 500 a
/// domain-level internal failure would produce, rather than closing the
/// connection with no response at all.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    error!(error = %InternalError::InvariantViolated(message), "request handler panicked");
    internal_error()
}
