// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end tests against the query router, backed by a real
//! target-manager service bound to an ephemeral local port so the
//! `TargetManagerClient` exercises a genuine HTTP round trip.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use ircloud_mock_core::auth::{canonical_string, sign, SignedRequest};
use ircloud_mock_core::clock::{Clock, FakeClock};
use ircloud_mock_core::image::{ImageMatcherChoice, TargetRaterChoice};
use ircloud_mock_core::query::MATCH_PROCESSING_BODY;
use ircloud_mock_core::store::Store;
use ircloud_mock_query_api::client::TargetManagerClient;
use ircloud_mock_query_api::{routes, state::AppState};
use ircloud_mock_target_api::state::AppState as TargetAppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(w, h);
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn png_base64(w: u32, h: u32) -> String {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    BASE64.encode(png_bytes(w, h))
}

/// Spawns a real target-manager service on an ephemeral port, sharing
/// `clock` with the caller so query-side window tests can advance both
/// services' notion of "now" together.
async fn spawn_target_manager(clock: Arc<dyn Clock>) -> String {
    let state = Arc::new(TargetAppState::new(
        Store::new(),
        clock,
        ImageMatcherChoice::Exact.build(),
        TargetRaterChoice::Random.build(),
    ));
    let app = ircloud_mock_target_api::routes::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn query_router(base_url: String, clock: Arc<dyn Clock>) -> axum::Router {
    let state = Arc::new(AppState::new(
        TargetManagerClient::new(base_url),
        clock,
        ImageMatcherChoice::Exact.build(),
        TargetRaterChoice::Random.build(),
        0.2,
        3.0,
    ));
    routes::build_router(state)
}

async fn create_database(base_url: &str, name: &str, state_value: &str) -> (String, String) {
    let body = json!({
        "database_name": name,
        "server_access_key": format!("{name}-server-access"),
        "server_secret_key": format!("{name}-server-secret"),
        "client_access_key": format!("{name}-client-access"),
        "client_secret_key": format!("{name}-client-secret"),
        "state_value": state_value,
    });
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{base_url}/databases"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    (
        format!("{name}-client-access"),
        format!("{name}-client-secret"),
    )
}

#[allow(clippy::too_many_arguments)]
async fn create_target_fixture(
    base_url: &str,
    database_name: &str,
    target_id: &str,
    image: &[u8],
    processing_time_seconds: f64,
) {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    let body = json!({
        "target_id": target_id,
        "name": target_id,
        "width": 1.0,
        "image_base64": BASE64.encode(image),
        "active_flag": true,
        "processing_time_seconds": processing_time_seconds,
        "application_metadata": null,
    });
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{base_url}/databases/{database_name}/targets"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
}

async fn delete_target_fixture(base_url: &str, database_name: &str, target_id: &str) {
    let client = reqwest::Client::new();
    let response = client
        .delete(format!("{base_url}/databases/{database_name}/targets/{target_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

fn multipart_body(boundary: &str, image: &[u8], max_num_results: Option<u32>) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"image\"; filename=\"q.png\"\r\n",
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(image);
    body.extend_from_slice(b"\r\n");
    if let Some(n) = max_num_results {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"max_num_results\"\r\n\r\n");
        body.extend_from_slice(n.to_string().as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

fn signed_query_request(
    image: &[u8],
    max_num_results: Option<u32>,
    access_key: &str,
    secret_key: &str,
) -> Request<Body> {
    let boundary = "ircloudmocktestboundary";
    let body = multipart_body(boundary, image, max_num_results);
    let content_type = format!("multipart/form-data; boundary={boundary}");
    let date_header = httpdate::fmt_http_date(std::time::SystemTime::now());
    let signed = SignedRequest {
        method: "POST",
        path: "/v1/query",
        body: &body,
        content_type: Some(&content_type),
        date_header: &date_header,
        authorization_header: None,
    };
    let canonical = canonical_string(&signed);
    let signature = sign(secret_key, &canonical);
    let auth_header = format!("VWS {access_key}:{signature}");

    Request::builder()
        .method("POST")
        .uri("/v1/query")
        .header("date", date_header)
        .header("authorization", auth_header)
        .header("content-type", content_type)
        .header("content-length", body.len().to_string())
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn happy_path_query_matches_finalized_target() {
    let clock = Arc::new(FakeClock::new(chrono::Utc::now()));
    let base_url = spawn_target_manager(clock.clone()).await;
    let (access_key, secret_key) = create_database(&base_url, "db-happy", "working").await;
    let image = png_bytes(4, 4);
    create_target_fixture(&base_url, "db-happy", "t1", &image, 0.0).await;

    let app = query_router(base_url, clock);
    let request = signed_query_request(&image, Some(5), &access_key, &secret_key);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let results = body_json(response).await;
    assert_eq!(results["results"][0]["target_id"], "t1");
}

#[tokio::test]
async fn query_during_processing_returns_canned_500() {
    let clock = Arc::new(FakeClock::new(chrono::Utc::now()));
    let base_url = spawn_target_manager(clock.clone()).await;
    let (access_key, secret_key) = create_database(&base_url, "db-processing", "working").await;
    let image = png_bytes(4, 4);
    create_target_fixture(&base_url, "db-processing", "t1", &image, 30.0).await;

    let app = query_router(base_url, clock);
    let request = signed_query_request(&image, None, &access_key, &secret_key);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), MATCH_PROCESSING_BODY.as_bytes());
}

#[tokio::test]
async fn deleted_target_still_matches_within_recognition_window() {
    let clock = Arc::new(FakeClock::new(chrono::Utc::now()));
    let base_url = spawn_target_manager(clock.clone()).await;
    let (access_key, secret_key) = create_database(&base_url, "db-recog", "working").await;
    let image = png_bytes(4, 4);
    create_target_fixture(&base_url, "db-recog", "t1", &image, 0.0).await;
    delete_target_fixture(&base_url, "db-recog", "t1").await;

    let app = query_router(base_url, clock);
    let request = signed_query_request(&image, None, &access_key, &secret_key);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let results = body_json(response).await;
    assert_eq!(results["results"][0]["target_id"], "t1");
}

#[tokio::test]
async fn deleted_target_past_recognition_window_returns_processing() {
    let clock = Arc::new(FakeClock::new(chrono::Utc::now()));
    let base_url = spawn_target_manager(clock.clone()).await;
    let (access_key, secret_key) = create_database(&base_url, "db-delproc", "working").await;
    let image = png_bytes(4, 4);
    create_target_fixture(&base_url, "db-delproc", "t1", &image, 0.0).await;
    delete_target_fixture(&base_url, "db-delproc", "t1").await;
    clock.advance(Duration::milliseconds(500));

    let app = query_router(base_url, clock);
    let request = signed_query_request(&image, None, &access_key, &secret_key);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn bad_signature_is_reported_before_malformed_body() {
    let clock = Arc::new(FakeClock::new(chrono::Utc::now()));
    let base_url = spawn_target_manager(clock.clone()).await;
    let (access_key, _secret_key) = create_database(&base_url, "db-auth", "working").await;

    let app = query_router(base_url, clock);
    let date_header = httpdate::fmt_http_date(std::time::SystemTime::now());
    let request = Request::builder()
        .method("POST")
        .uri("/v1/query")
        .header("date", date_header)
        .header("authorization", format!("VWS {access_key}:not-a-real-signature"))
        .header("content-type", "multipart/form-data; boundary=x")
        .header("content-length", "0")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error = body_json(response).await;
    assert_eq!(error["result_code"], "AuthenticationFailure");
}

#[tokio::test]
async fn inactive_project_query_returns_422() {
    let clock = Arc::new(FakeClock::new(chrono::Utc::now()));
    let base_url = spawn_target_manager(clock.clone()).await;
    let (access_key, secret_key) = create_database(&base_url, "db-inactive", "inactive").await;
    let image = png_bytes(4, 4);

    let app = query_router(base_url, clock);
    let request = signed_query_request(&image, None, &access_key, &secret_key);
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), 422);
    let error = body_json(response).await;
    assert_eq!(error["result_code"], "InactiveProject");
}
