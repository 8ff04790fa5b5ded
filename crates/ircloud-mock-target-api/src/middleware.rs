// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runs the shared VWS validator chain (§4.4) ahead of a handler's own
//! domain logic, in the fixed order the chain requires.

use chrono::{DateTime, Utc};
use http::HeaderMap;
use ircloud_mock_core::error::Failure;
use ircloud_mock_core::store::Store;
use ircloud_mock_core::validators::{common, RequestContext};

/// Runs content-length, date/skew and authorization checks, then resolves
/// and checks the owning database's project state. Returns the resolved
/// database name on success.
pub async fn authorize_vws_request(
    method: &str,
    path: &str,
    headers: &HeaderMap,
    body: &[u8],
    store: &Store,
    now: DateTime<Utc>,
) -> Result<String, Failure> {
    let ctx = RequestContext {
        method,
        path,
        headers,
        body,
    };
    common::check_content_length(&ctx)?;
    common::check_date(&ctx, now)?;
    let database_name = common::check_authorization(&ctx, store, false).await?;
    let state = store
        .with_database(&database_name, |db| db.state)
        .await
        .map_err(|_| Failure::json_result(404, ircloud_mock_core::constants::ResultCode::Fail))?;
    common::check_project_state(state, 403)?;
    Ok(database_name)
}
