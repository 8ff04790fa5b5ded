// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The query (VWQ) handler (§4.6): the one route this service exposes.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use ircloud_mock_core::error::Failure;
use ircloud_mock_core::query::{self, QueryOutcome, QueryWindows};
use ircloud_mock_core::validators::vwq::{self, ExtractedQueryFields};
use ircloud_mock_core::validators::RequestContext;

use crate::middleware::authorize_vwq_request;
use crate::render;
use crate::state::AppState;

pub async fn query(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let now = state.clock.now();
    let authorized = match authorize_vwq_request(
        "POST",
        "/v1/query",
        &headers,
        &body,
        &state.target_manager,
        now,
    )
    .await
    {
        Ok(authorized) => authorized,
        Err(failure) => return render::failure(failure),
    };

    let ctx = RequestContext {
        method: "POST",
        path: "/v1/query",
        headers: &headers,
        body: &body,
    };
    if let Err(failure) = vwq::check_content_type(&ctx) {
        return render::failure(failure);
    }
    let boundary = match vwq::extract_boundary(&ctx) {
        Ok(boundary) => boundary,
        Err(failure) => return render::failure(failure),
    };
    if let Err(failure) = vwq::check_boundary_in_body(&body, &boundary) {
        return render::failure(failure);
    }
    if let Err(failure) = vwq::check_accept_header(&ctx) {
        return render::failure(failure);
    }

    let fields = match extract_fields(body, boundary).await {
        Ok(fields) => fields,
        Err(failure) => return render::failure(failure),
    };
    let validated = match vwq::validate_query_fields(fields) {
        Ok(validated) => validated,
        Err(failure) => return render::failure(failure),
    };

    let windows = QueryWindows {
        recognition_window: state.recognition_window,
        processing_window: state.processing_window,
    };
    let matcher = state.query_matcher.as_ref();
    let rater = state.rater.as_ref();
    let outcome = authorized
        .store
        .with_database(&authorized.database_name, |db| {
            db.finalize_processing(rater, now);
            query::run_query(
                db,
                matcher,
                &validated.image,
                validated.max_num_results,
                validated.include_target_data,
                windows,
                now,
            )
        })
        .await;

    match outcome {
        Ok(QueryOutcome::MatchProcessing) => render::match_processing(),
        Ok(QueryOutcome::Matched(results)) => render::success_json(StatusCode::OK, &results),
        Err(_) => render::failure(Failure::json_result(
            404,
            ircloud_mock_core::constants::ResultCode::Fail,
        )),
    }
}

/// Decodes the already-boundary-validated multipart body into the raw
/// fields the domain validator checks next. Actual RFC 2046 parsing is
/// `multer`'s job (the same crate axum's own `Multipart` extractor wraps);
/// it runs here, rather than as an axum extractor, because the validator
/// chain above needs the raw body bytes for the signature digest and the
/// boundary-in-body check before any multipart parsing is attempted.
async fn extract_fields(body: Bytes, boundary: String) -> Result<ExtractedQueryFields, Failure> {
    let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = ExtractedQueryFields::default();
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|_| bad_request())?;
        let Some(field) = field else { break };
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let bytes = field.bytes().await.map_err(|_| bad_request())?;
                fields.image_parts.push(bytes.to_vec());
            }
            "max_num_results" => {
                let text = field.text().await.map_err(|_| bad_request())?;
                fields.max_num_results_raw = Some(text);
            }
            "include_target_data" => {
                let text = field.text().await.map_err(|_| bad_request())?;
                fields.include_target_data_raw = Some(text);
            }
            _ => {}
        }
    }
    Ok(fields)
}

fn bad_request() -> Failure {
    Failure::json_result(400, ircloud_mock_core::constants::ResultCode::Fail)
}
