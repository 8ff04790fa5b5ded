// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Ordered, pure validator chains (§4.4).
//!
//! Each validator is `(request_ctx, store) -> Result<(), Failure>` (or, for
//! the ones that resolve state, `Result<T, Failure>`). The chain runner
//! stops at the first failure; none of the later validators run. This
//! mirrors the real service's before-request hook without any framework
//! introspection, per the re-architecture notes in spec §9.

pub mod common;
pub mod vwq;
pub mod vws;

use http::HeaderMap;

/// One inbound request's fields, as seen by the validator chains. Framework
/// code at the HTTP-adapter layer builds this from the real request; the
/// validators themselves never touch axum types.
pub struct RequestContext<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
}

impl<'a> RequestContext<'a> {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
