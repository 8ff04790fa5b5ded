// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validators shared by both the VWS and VWQ chains, in the exact order
//! spec §4.4 requires (Content-Length, Date, skew, auth, project state).

use chrono::{DateTime, Utc};

use crate::auth::{resolve_database, SignedRequest};
use crate::constants::{ProjectState, ResultCode, MAX_CONTENT_LENGTH, MAX_REQUEST_TIME_SKEW_SECONDS};
use crate::error::{AuthError, Failure};
use crate::store::Store;

use super::RequestContext;

/// Steps 1-3: `Content-Length` presence, parseability, cap, and consistency
/// with the actual body length.
pub fn check_content_length(ctx: &RequestContext<'_>) -> Result<(), Failure> {
    let Some(raw) = ctx.header("content-length") else {
        // No Content-Length header at all: the body length is what it is;
        // nothing further to check here (some clients omit it legitimately
        // for chunked bodies, which axum has already fully buffered by the
        // time validators run).
        return Ok(());
    };
    let declared: u64 = raw
        .parse()
        .map_err(|_| Failure::empty(400).with_header("connection", "close"))?;
    if declared > MAX_CONTENT_LENGTH {
        return Err(Failure::json_result(413, ResultCode::Fail));
    }
    if declared as usize != ctx.body.len() {
        // Over-long relative to the declared length: the real service
        // answers 400 (it never receives the full body it expected). Under-
        // long bodies are handled upstream by the HTTP layer's own framing
        // before validators ever run.
        if ctx.body.len() < declared as usize {
            return Err(Failure::json_result(400, ResultCode::RequestTimeTooSkewed));
        }
        return Err(Failure::json_result(413, ResultCode::Fail));
    }
    Ok(())
}

/// Steps 4-6: `Date` header presence, RFC 1123 parseability, and skew
/// against wall-clock time.
pub fn check_date(ctx: &RequestContext<'_>, now: DateTime<Utc>) -> Result<DateTime<Utc>, Failure> {
    let Some(raw) = ctx.header("date") else {
        return Err(Failure::json_result(400, ResultCode::Fail));
    };
    let parsed = httpdate_to_utc(raw).ok_or_else(|| Failure::json_result(400, ResultCode::Fail))?;
    let skew = (now - parsed).num_seconds().abs();
    if skew > MAX_REQUEST_TIME_SKEW_SECONDS {
        return Err(Failure::json_result(
            forbidden_status_for_skew(),
            ResultCode::RequestTimeTooSkewed,
        ));
    }
    Ok(parsed)
}

fn forbidden_status_for_skew() -> u16 {
    403
}

fn httpdate_to_utc(raw: &str) -> Option<DateTime<Utc>> {
    let system_time = httpdate::parse_http_date(raw).ok()?;
    Some(DateTime::<Utc>::from(system_time))
}

/// Step 7: authorization header presence, well-formedness and credential
/// match (§4.3), delegating to [`resolve_database`].
pub async fn check_authorization(
    ctx: &RequestContext<'_>,
    store: &Store,
    allow_client_key: bool,
) -> Result<String, Failure> {
    let signed = SignedRequest {
        method: ctx.method,
        path: ctx.path,
        body: ctx.body,
        content_type: ctx.header("content-type"),
        date_header: ctx.header("date").unwrap_or_default(),
        authorization_header: ctx.header("authorization"),
    };
    resolve_database(store, &signed, allow_client_key)
        .await
        .map_err(|err| match err {
            AuthError::HeaderMissing => Failure::json_result(401, ResultCode::AuthenticationFailure),
            AuthError::Malformed => Failure::json_result(400, ResultCode::Fail),
            AuthError::Failure => Failure::json_result(401, ResultCode::AuthenticationFailure),
        })
}

/// Step 8: project state must be `working`, or the request is rejected with
/// a side-specific status code (403 for VWS, 422 for VWQ).
pub fn check_project_state(state: ProjectState, inactive_status: u16) -> Result<(), Failure> {
    if state == ProjectState::Inactive {
        return Err(Failure::json_result(
            inactive_status,
            ResultCode::InactiveProject,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;

    fn ctx<'a>(headers: &'a HeaderMap, body: &'a [u8]) -> RequestContext<'a> {
        RequestContext {
            method: "GET",
            path: "/targets",
            headers,
            body,
        }
    }

    #[test]
    fn content_length_not_int_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", "abc".parse().unwrap());
        let err = check_content_length(&ctx(&headers, b"")).unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[test]
    fn content_length_too_large_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", "99999999999".parse().unwrap());
        let err = check_content_length(&ctx(&headers, b"")).unwrap_err();
        assert_eq!(err.status, 413);
    }

    #[test]
    fn missing_date_header_rejected_before_auth() {
        let headers = HeaderMap::new();
        let err = check_date(&ctx(&headers, b""), Utc::now()).unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[test]
    fn skewed_date_is_rejected() {
        let mut headers = HeaderMap::new();
        let old = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
        headers.insert("date", httpdate::fmt_http_date(old).parse().unwrap());
        let err = check_date(&ctx(&headers, b""), Utc::now()).unwrap_err();
        assert_eq!(err.status, 403);
    }

    #[test]
    fn project_state_inactive_uses_caller_supplied_status() {
        let err = check_project_state(ProjectState::Inactive, 422).unwrap_err();
        assert_eq!(err.status, 422);
    }

    #[test]
    fn project_state_working_passes() {
        assert!(check_project_state(ProjectState::Working, 403).is_ok());
    }
}
