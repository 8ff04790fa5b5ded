// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runs the shared VWQ validator chain (§4.4) ahead of the query handler's
//! own domain logic. Unlike the target-manager service, this service owns
//! no persistent store of its own: every request rebuilds a transient
//! [`Store`] from the target-manager's snapshot endpoint, exactly as the
//! distilled source calls `get_all_databases()` fresh on every query.

use chrono::{DateTime, Utc};
use http::HeaderMap;
use ircloud_mock_core::error::Failure;
use ircloud_mock_core::store::Store;
use ircloud_mock_core::validators::{common, RequestContext};
use tracing::error;

use crate::client::TargetManagerClient;

/// Inactive-project rejections on the query side use 422, not the VWS
/// service's 403 (§4.4 step 8).
const INACTIVE_PROJECT_STATUS: u16 = 422;

pub struct Authorized {
    pub store: Store,
    pub database_name: String,
}

/// Fetches a fresh snapshot, runs content-length, date/skew, authorization
/// (accepting either server or client keys, per §4.3's VWQ rule) and
/// project-state checks, and hands back the populated transient store so
/// the handler never has to fetch twice.
pub async fn authorize_vwq_request(
    method: &str,
    path: &str,
    headers: &HeaderMap,
    body: &[u8],
    target_manager: &TargetManagerClient,
    now: DateTime<Utc>,
) -> Result<Authorized, Failure> {
    let ctx = RequestContext {
        method,
        path,
        headers,
        body,
    };
    common::check_content_length(&ctx)?;
    common::check_date(&ctx, now)?;

    let databases = target_manager.fetch_databases().await.map_err(|err| {
        error!(%err, "failed to fetch database snapshot from target manager");
        Failure::json_result(500, ircloud_mock_core::constants::ResultCode::Fail)
    })?;
    let store = Store::new();
    for database in databases {
        // Snapshots are already consistent (target-manager enforces
        // credential uniqueness); a duplicate here would only arise from a
        // misbehaving target-manager and is not worth failing the query over.
        let _ = store.create_database(database).await;
    }

    let database_name = common::check_authorization(&ctx, &store, true).await?;
    let state = store
        .with_database(&database_name, |db| db.state)
        .await
        .map_err(|_| Failure::json_result(404, ircloud_mock_core::constants::ResultCode::Fail))?;
    common::check_project_state(state, INACTIVE_PROJECT_STATUS)?;

    Ok(Authorized {
        store,
        database_name,
    })
}
