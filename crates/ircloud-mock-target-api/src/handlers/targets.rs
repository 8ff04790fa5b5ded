// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! VWS target-manager handlers (§4.5).

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use ircloud_mock_core::validators::vws;

use crate::middleware::authorize_vws_request;
use crate::render;
use crate::state::AppState;

pub async fn create_target(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let now = state.clock.now();
    let database_name = match authorize_vws_request(
        "POST",
        "/targets",
        &headers,
        &body,
        &state.store,
        now,
    )
    .await
    {
        Ok(name) => name,
        Err(failure) => return render::failure(failure),
    };

    let fields = match vws::validate_create_body(&body) {
        Ok(fields) => fields,
        Err(failure) => return render::failure(failure),
    };

    match ircloud_mock_core::management::create_target(&state.store, &database_name, fields, now)
        .await
    {
        Ok(created) => render::success_json(StatusCode::CREATED, &created),
        Err(failure) => render::failure(failure),
    }
}

pub async fn list_targets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let now = state.clock.now();
    let database_name =
        match authorize_vws_request("GET", "/targets", &headers, &body, &state.store, now).await {
            Ok(name) => name,
            Err(failure) => return render::failure(failure),
        };

    match ircloud_mock_core::management::list_targets(&state.store, &database_name).await {
        Ok(list) => render::success_json(StatusCode::OK, &list),
        Err(failure) => render::failure(failure),
    }
}

pub async fn get_target(
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let now = state.clock.now();
    let path = format!("/targets/{target_id}");
    let database_name =
        match authorize_vws_request("GET", &path, &headers, &body, &state.store, now).await {
            Ok(name) => name,
            Err(failure) => return render::failure(failure),
        };

    match ircloud_mock_core::management::get_target(
        &state.store,
        &database_name,
        &target_id,
        state.rater.as_ref(),
        now,
    )
    .await
    {
        Ok(record) => render::success_json(StatusCode::OK, &record),
        Err(failure) => render::failure(failure),
    }
}

pub async fn update_target(
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let now = state.clock.now();
    let path = format!("/targets/{target_id}");
    let database_name =
        match authorize_vws_request("PUT", &path, &headers, &body, &state.store, now).await {
            Ok(name) => name,
            Err(failure) => return render::failure(failure),
        };

    let fields = match vws::validate_update_body(&body) {
        Ok(fields) => fields,
        Err(failure) => return render::failure(failure),
    };

    match ircloud_mock_core::management::update_target(
        &state.store,
        &database_name,
        &target_id,
        fields,
        state.rater.as_ref(),
        now,
    )
    .await
    {
        Ok(()) => render::success_json(
            StatusCode::OK,
            &serde_json::json!({
                "result_code": "Success",
                "transaction_id": ircloud_mock_core::ids::new_hex_id(),
            }),
        ),
        Err(failure) => render::failure(failure),
    }
}

pub async fn delete_target(
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let now = state.clock.now();
    let path = format!("/targets/{target_id}");
    let database_name =
        match authorize_vws_request("DELETE", &path, &headers, &body, &state.store, now).await {
            Ok(name) => name,
            Err(failure) => return render::failure(failure),
        };

    match ircloud_mock_core::management::delete_target(&state.store, &database_name, &target_id, now)
        .await
    {
        Ok(()) => render::success_json(
            StatusCode::OK,
            &serde_json::json!({
                "result_code": "Success",
                "transaction_id": ircloud_mock_core::ids::new_hex_id(),
            }),
        ),
        Err(failure) => render::failure(failure),
    }
}

pub async fn database_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let now = state.clock.now();
    let database_name =
        match authorize_vws_request("GET", "/summary", &headers, &body, &state.store, now).await {
            Ok(name) => name,
            Err(failure) => return render::failure(failure),
        };

    match ircloud_mock_core::management::database_summary(
        &state.store,
        &database_name,
        state.rater.as_ref(),
        now,
    )
    .await
    {
        Ok(summary) => render::success_json(StatusCode::OK, &summary),
        Err(failure) => render::failure(failure),
    }
}

pub async fn target_summary(
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let now = state.clock.now();
    let path = format!("/targets/{target_id}/summary");
    let database_name =
        match authorize_vws_request("GET", &path, &headers, &body, &state.store, now).await {
            Ok(name) => name,
            Err(failure) => return render::failure(failure),
        };

    match ircloud_mock_core::management::target_summary(
        &state.store,
        &database_name,
        &target_id,
        state.rater.as_ref(),
        now,
    )
    .await
    {
        Ok(summary) => render::success_json(StatusCode::OK, &summary),
        Err(failure) => render::failure(failure),
    }
}

pub async fn duplicates(
    State(state): State<Arc<AppState>>,
    Path(target_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let now = state.clock.now();
    let path = format!("/duplicates/{target_id}");
    let database_name =
        match authorize_vws_request("GET", &path, &headers, &body, &state.store, now).await {
            Ok(name) => name,
            Err(failure) => return render::failure(failure),
        };

    match ircloud_mock_core::management::duplicates(
        &state.store,
        &database_name,
        &target_id,
        state.duplicate_matcher.as_ref(),
        state.rater.as_ref(),
        now,
    )
    .await
    {
        Ok(found) => render::success_json(StatusCode::OK, &found),
        Err(failure) => render::failure(failure),
    }
}
