// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Administrative fixture endpoints (§6): install and tear down databases
//! and targets directly, bypassing the VWS validator chain and signature
//! scheme entirely. These are the seams test harnesses use to set up state.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use ircloud_mock_core::constants::ProjectState;
use ircloud_mock_core::database::{Credentials, Database};
use serde::Deserialize;

use crate::render;
use crate::state::AppState;

pub async fn reset(State(state): State<Arc<AppState>>) -> Response {
    state.store.reset().await;
    render::success_json(StatusCode::OK, &serde_json::json!({}))
}

/// The query-api's `get_all_databases()` equivalent: the full in-memory
/// snapshot, targets included, not just the credential summary a human
/// operator would want. `Database`/`Target` are plain serde structs, so
/// this is the same wire shape the query-api deserializes straight back
/// into its own local `Store`.
pub async fn list_databases(State(state): State<Arc<AppState>>) -> Response {
    let databases = state.store.snapshot().await;
    render::success_json(StatusCode::OK, &databases)
}

#[derive(Debug, Deserialize)]
pub struct CreateDatabaseRequest {
    server_access_key: String,
    server_secret_key: String,
    client_access_key: String,
    client_secret_key: String,
    database_name: String,
    state_value: String,
    #[serde(default = "default_processing_time_seconds")]
    default_processing_time_seconds: f64,
}

fn default_processing_time_seconds() -> f64 {
    3.0
}

pub async fn create_database(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDatabaseRequest>,
) -> Response {
    let project_state = match req.state_value.as_str() {
        "working" => ProjectState::Working,
        "inactive" => ProjectState::Inactive,
        _ => {
            return render::failure(ircloud_mock_core::error::Failure::json_result(
                400,
                ircloud_mock_core::constants::ResultCode::Fail,
            ))
        }
    };
    let database = Database::new(
        req.database_name.clone(),
        Credentials {
            server_access_key: req.server_access_key,
            server_secret_key: req.server_secret_key,
            client_access_key: req.client_access_key,
            client_secret_key: req.client_secret_key,
        },
        project_state,
        req.default_processing_time_seconds,
    );
    match state.store.create_database(database).await {
        Ok(()) => render::success_json(
            StatusCode::CREATED,
            &serde_json::json!({ "database_name": req.database_name }),
        ),
        Err(ircloud_mock_core::error::StoreError::DuplicateCredential(_)) => render::failure(
            ircloud_mock_core::error::Failure::json_result(409, ircloud_mock_core::constants::ResultCode::Fail),
        ),
        Err(_) => render::failure(ircloud_mock_core::error::Failure::json_result(
            400,
            ircloud_mock_core::constants::ResultCode::Fail,
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTargetFixtureRequest {
    target_id: String,
    name: String,
    width: f64,
    image_base64: String,
    active_flag: bool,
    processing_time_seconds: f64,
    application_metadata: Option<String>,
}

pub async fn create_target_fixture(
    State(state): State<Arc<AppState>>,
    Path(database_name): Path<String>,
    Json(req): Json<CreateTargetFixtureRequest>,
) -> Response {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    let image = match BASE64.decode(&req.image_base64) {
        Ok(bytes) => bytes,
        Err(_) => {
            return render::failure(ircloud_mock_core::error::Failure::json_result(
                400,
                ircloud_mock_core::constants::ResultCode::BadImage,
            ))
        }
    };
    let now = state.clock.now();
    match state
        .store
        .create_target_fixture(
            &database_name,
            req.target_id.clone(),
            req.name,
            req.width,
            image,
            req.active_flag,
            req.application_metadata,
            req.processing_time_seconds,
            now,
        )
        .await
    {
        Ok(()) => render::success_json(
            StatusCode::CREATED,
            &serde_json::json!({ "target_id": req.target_id }),
        ),
        Err(_) => render::failure(ircloud_mock_core::error::Failure::json_result(
            404,
            ircloud_mock_core::constants::ResultCode::UnknownTarget,
        )),
    }
}

pub async fn delete_target_fixture(
    State(state): State<Arc<AppState>>,
    Path((database_name, target_id)): Path<(String, String)>,
) -> Response {
    let now = state.clock.now();
    match state
        .store
        .delete_target_fixture(&database_name, &target_id, now)
        .await
    {
        Ok(()) => render::success_json(StatusCode::OK, &serde_json::json!({})),
        Err(_) => render::failure(ircloud_mock_core::error::Failure::json_result(
            404,
            ircloud_mock_core::constants::ResultCode::UnknownTarget,
        )),
    }
}
