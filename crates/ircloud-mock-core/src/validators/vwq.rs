// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validators specific to the query (VWQ) chain (§4.4).
//!
//! Actual RFC 2046 multipart decoding is an external collaborator (spec
//! §1) performed by the HTTP-adapter layer (the query-api binary, via
//! axum's `Multipart` extractor). This module validates the pieces the
//! spec calls out explicitly: the boundary's presence in the
//! `Content-Type` header and in the raw body (checked before any multipart
//! decode is attempted, so a malformed boundary gets the exact error the
//! real service gives rather than an opaque parse failure), and the
//! semantics of the already-extracted fields.

use crate::constants::{
    IncludeTargetData, ResultCode, MAX_IMAGE_DIMENSION_PX, MAX_MAX_NUM_RESULTS,
    MIN_IMAGE_DIMENSION_PX, MIN_MAX_NUM_RESULTS,
};
use crate::error::Failure;
use crate::image::matcher::{decode, looks_like_png_or_jpeg};

use super::RequestContext;

fn fail(status: u16, code: ResultCode) -> Failure {
    Failure::json_result(status, code)
}

/// `Content-Type` must begin with `multipart/form-data`, else
/// `UnsupportedMediaType` (415, no `Content-Type` on the response — this is
/// the documented intent per spec §9's open-question resolution, not the
/// distilled source's stopgap).
pub fn check_content_type(ctx: &RequestContext<'_>) -> Result<(), Failure> {
    let content_type = ctx.header("content-type").unwrap_or_default();
    if !content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        return Err(Failure::empty(415));
    }
    Ok(())
}

/// Extracts the `boundary=` parameter from `Content-Type`, or
/// `NoBoundaryFound`.
pub fn extract_boundary(ctx: &RequestContext<'_>) -> Result<String, Failure> {
    let content_type = ctx.header("content-type").unwrap_or_default();
    content_type
        .split(';')
        .skip(1)
        .map(str::trim)
        .find_map(|param| param.strip_prefix("boundary="))
        .map(|b| b.trim_matches('"').to_string())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| fail(400, ResultCode::Fail))
}

/// The boundary string must actually appear in the body, or
/// `BoundaryNotInBody`.
pub fn check_boundary_in_body(body: &[u8], boundary: &str) -> Result<(), Failure> {
    let needle = boundary.as_bytes();
    if body.windows(needle.len().max(1)).any(|w| w == needle) {
        Ok(())
    } else {
        Err(fail(400, ResultCode::Fail))
    }
}

/// `Accept` header must be absent or exactly `application/json`, else
/// `InvalidAcceptHeader`.
pub fn check_accept_header(ctx: &RequestContext<'_>) -> Result<(), Failure> {
    match ctx.header("accept") {
        None => Ok(()),
        Some(value) if value.trim() == "application/json" => Ok(()),
        Some(_) => Err(fail(406, ResultCode::Fail)),
    }
}

/// Raw, already-decoded multipart form fields, extracted by the
/// HTTP-adapter layer ahead of domain validation.
#[derive(Debug, Default)]
pub struct ExtractedQueryFields {
    pub image_parts: Vec<Vec<u8>>,
    pub max_num_results_raw: Option<String>,
    pub include_target_data_raw: Option<String>,
}

/// The validated, defaulted query request (§4.6 step 1).
#[derive(Debug)]
pub struct ValidatedQuery {
    pub image: Vec<u8>,
    pub max_num_results: u32,
    pub include_target_data: IncludeTargetData,
}

/// Validates the extracted multipart fields per the remaining VWQ-specific
/// rules: exactly one `image` part, `max_num_results` parses and is in
/// range, `include_target_data` is one of the known values, and the image
/// decodes within query size limits.
pub fn validate_query_fields(fields: ExtractedQueryFields) -> Result<ValidatedQuery, Failure> {
    let mut images = fields.image_parts;
    if images.len() != 1 {
        return Err(fail(400, ResultCode::Fail));
    }
    let image = images.remove(0);

    let max_num_results = match fields.max_num_results_raw {
        None => 1,
        Some(raw) => raw.parse::<u32>().map_err(|_| fail(400, ResultCode::Fail))?,
    };
    if !(MIN_MAX_NUM_RESULTS..=MAX_MAX_NUM_RESULTS).contains(&max_num_results) {
        return Err(fail(400, ResultCode::Fail));
    }

    let include_target_data = match fields.include_target_data_raw {
        None => IncludeTargetData::Top,
        Some(raw) => IncludeTargetData::parse(&raw).ok_or_else(|| fail(400, ResultCode::Fail))?,
    };

    if !looks_like_png_or_jpeg(&image) {
        return Err(fail(400, ResultCode::BadImage));
    }
    let decoded = decode(&image).ok_or_else(|| fail(400, ResultCode::BadImage))?;
    let (w, h) = (decoded.width(), decoded.height());
    if w < MIN_IMAGE_DIMENSION_PX
        || h < MIN_IMAGE_DIMENSION_PX
        || w > MAX_IMAGE_DIMENSION_PX
        || h > MAX_IMAGE_DIMENSION_PX
    {
        return Err(fail(400, ResultCode::ImageTooLarge));
    }

    Ok(ValidatedQuery {
        image,
        max_num_results,
        include_target_data,
    })
}
