// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validators specific to the management (VWS) chain (§4.4).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

use crate::constants::{
    ResultCode, MAX_IMAGE_DIMENSION_PX, MAX_IMAGE_BYTES_DECODED, MAX_METADATA_BYTES_DECODED,
    MAX_NAME_LEN, MIN_IMAGE_DIMENSION_PX, MIN_NAME_LEN,
};
use crate::error::Failure;
use crate::image::matcher::{decode, looks_like_png_or_jpeg};

/// Fields accepted by `POST /targets` or `PUT /targets/{id}`, after
/// validation. All fields are optional at this layer because `PUT` is a
/// partial update (§4.5); `POST` enforces its own required-fields rule in
/// [`validate_create_body`].
#[derive(Debug, Default, Clone)]
pub struct ValidatedTargetFields {
    pub name: Option<String>,
    pub width: Option<f64>,
    pub image: Option<Vec<u8>>,
    pub active_flag: Option<bool>,
    pub application_metadata: Option<String>,
}

const ALLOWED_FIELDS: &[&str] = &["name", "width", "image", "active_flag", "application_metadata"];

fn fail(status: u16, code: ResultCode) -> Failure {
    Failure::json_result(status, code)
}

fn parse_json(body: &[u8]) -> Result<Value, Failure> {
    if body.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body).map_err(|_| fail(400, ResultCode::Fail))
}

fn reject_unknown_fields(obj: &serde_json::Map<String, Value>) -> Result<(), Failure> {
    for key in obj.keys() {
        if !ALLOWED_FIELDS.contains(&key.as_str()) {
            return Err(fail(400, ResultCode::Fail));
        }
    }
    Ok(())
}

fn validate_name(value: &Value) -> Result<String, Failure> {
    let s = value.as_str().ok_or_else(|| fail(400, ResultCode::Fail))?;
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&s.chars().count()) {
        return Err(fail(400, ResultCode::Fail));
    }
    if !s.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        return Err(fail(400, ResultCode::Fail));
    }
    Ok(s.to_string())
}

fn validate_width(value: &Value) -> Result<f64, Failure> {
    let w = value.as_f64().ok_or_else(|| fail(400, ResultCode::Fail))?;
    if !(w > 0.0) {
        return Err(fail(400, ResultCode::Fail));
    }
    Ok(w)
}

fn validate_image(value: &Value) -> Result<Vec<u8>, Failure> {
    let s = value.as_str().ok_or_else(|| fail(400, ResultCode::Fail))?;
    let bytes = BASE64
        .decode(s)
        .map_err(|_| fail(400, ResultCode::Fail))?;
    if !looks_like_png_or_jpeg(&bytes) {
        return Err(fail(400, ResultCode::BadImage));
    }
    let decoded = decode(&bytes).ok_or_else(|| fail(400, ResultCode::BadImage))?;
    let (w, h) = (decoded.width(), decoded.height());
    if w < MIN_IMAGE_DIMENSION_PX
        || h < MIN_IMAGE_DIMENSION_PX
        || w > MAX_IMAGE_DIMENSION_PX
        || h > MAX_IMAGE_DIMENSION_PX
    {
        return Err(fail(400, ResultCode::ImageTooLarge));
    }
    if bytes.len() > MAX_IMAGE_BYTES_DECODED {
        return Err(fail(400, ResultCode::ImageTooLarge));
    }
    Ok(bytes)
}

fn validate_active_flag(value: &Value) -> Result<bool, Failure> {
    value.as_bool().ok_or_else(|| fail(400, ResultCode::Fail))
}

fn validate_metadata(value: &Value) -> Result<String, Failure> {
    let s = value.as_str().ok_or_else(|| fail(400, ResultCode::Fail))?;
    let decoded = BASE64
        .decode(s)
        .map_err(|_| fail(400, ResultCode::Fail))?;
    if decoded.len() > MAX_METADATA_BYTES_DECODED {
        return Err(fail(400, ResultCode::MetadataTooLarge));
    }
    Ok(s.to_string())
}

fn validate_fields(obj: &serde_json::Map<String, Value>) -> Result<ValidatedTargetFields, Failure> {
    reject_unknown_fields(obj)?;
    let mut fields = ValidatedTargetFields::default();
    if let Some(v) = obj.get("name") {
        fields.name = Some(validate_name(v)?);
    }
    if let Some(v) = obj.get("width") {
        fields.width = Some(validate_width(v)?);
    }
    if let Some(v) = obj.get("image") {
        fields.image = Some(validate_image(v)?);
    }
    if let Some(v) = obj.get("active_flag") {
        fields.active_flag = Some(validate_active_flag(v)?);
    }
    if let Some(v) = obj.get("application_metadata") {
        fields.application_metadata = Some(validate_metadata(v)?);
    }
    Ok(fields)
}

/// `POST /targets` body validation: `name`, `width` and `image` are
/// required; `active_flag` and `application_metadata` are optional (§4.4,
/// §3).
pub fn validate_create_body(body: &[u8]) -> Result<ValidatedTargetFields, Failure> {
    let value = parse_json(body)?;
    let obj = value.as_object().ok_or_else(|| fail(400, ResultCode::Fail))?;
    let fields = validate_fields(obj)?;
    if fields.name.is_none() || fields.width.is_none() || fields.image.is_none() {
        return Err(fail(400, ResultCode::Fail));
    }
    Ok(fields)
}

/// `PUT /targets/{id}` body validation: every field is optional, but
/// whichever are present must individually validate (§4.5).
pub fn validate_update_body(body: &[u8]) -> Result<ValidatedTargetFields, Failure> {
    let value = parse_json(body)?;
    let obj = value.as_object().ok_or_else(|| fail(400, ResultCode::Fail))?;
    validate_fields(obj)
}
