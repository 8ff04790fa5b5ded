// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Route table for the target-manager service.

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin, targets};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/targets", post(targets::create_target))
        .route("/targets", get(targets::list_targets))
        .route("/targets/:target_id", get(targets::get_target))
        .route("/targets/:target_id", put(targets::update_target))
        .route("/targets/:target_id", delete(targets::delete_target))
        .route("/summary", get(targets::database_summary))
        .route("/targets/:target_id/summary", get(targets::target_summary))
        .route("/duplicates/:target_id", get(targets::duplicates))
        .route("/reset", post(admin::reset))
        .route("/databases", get(admin::list_databases))
        .route("/databases", post(admin::create_database))
        .route(
            "/databases/:database_name/targets",
            post(admin::create_target_fixture),
        )
        .route(
            "/databases/:database_name/targets/:target_id",
            delete(admin::delete_target_fixture),
        )
        .with_state(state)
}
