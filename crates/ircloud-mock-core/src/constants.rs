// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Frozen enumerations of wire-level strings.
//!
//! These map 1:1 onto the real service's result codes and status strings.
//! The exact spelling is part of the external contract; do not "improve" it.

use serde::{Deserialize, Serialize};

/// `result_code` values returned in VWS/VWQ response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    Success,
    TargetCreated,
    AuthenticationFailure,
    RequestTimeTooSkewed,
    TargetNameExist,
    UnknownTarget,
    BadImage,
    ImageTooLarge,
    MetadataTooLarge,
    DateRangeError,
    Fail,
    TargetStatusProcessing,
    TargetStatusNotSuccess,
    ProjectInactive,
    InactiveProject,
    MalformedRequest,
}

impl ResultCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ResultCode::Success => "Success",
            ResultCode::TargetCreated => "TargetCreated",
            ResultCode::AuthenticationFailure => "AuthenticationFailure",
            ResultCode::RequestTimeTooSkewed => "RequestTimeTooSkewed",
            ResultCode::TargetNameExist => "TargetNameExist",
            ResultCode::UnknownTarget => "UnknownTarget",
            ResultCode::BadImage => "BadImage",
            ResultCode::ImageTooLarge => "ImageTooLarge",
            ResultCode::MetadataTooLarge => "MetadataTooLarge",
            ResultCode::DateRangeError => "DateRangeError",
            ResultCode::Fail => "Fail",
            ResultCode::TargetStatusProcessing => "TargetStatusProcessing",
            ResultCode::TargetStatusNotSuccess => "TargetStatusNotSuccess",
            ResultCode::ProjectInactive => "ProjectInactive",
            ResultCode::InactiveProject => "InactiveProject",
            ResultCode::MalformedRequest => "MalformedRequest",
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived lifecycle status of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetStatus {
    Processing,
    Success,
    Failed,
}

impl TargetStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            TargetStatus::Processing => "processing",
            TargetStatus::Success => "success",
            TargetStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a database accepts traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectState {
    Working,
    Inactive,
}

impl ProjectState {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProjectState::Working => "working",
            ProjectState::Inactive => "inactive",
        }
    }
}

/// `include_target_data` query parameter values (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeTargetData {
    Top,
    All,
    None,
}

impl IncludeTargetData {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "all" => Some(Self::All),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Post-decode image size cap, in bytes (§3, §4.4).
pub const MAX_IMAGE_BYTES_DECODED: usize = 2_359_293;

/// `application_metadata`, decoded, size cap (§3).
pub const MAX_METADATA_BYTES_DECODED: usize = 1_048_576;

/// Maximum `Content-Length` the service will accept before the body is even read.
pub const MAX_CONTENT_LENGTH: u64 = 10 * 1024 * 1024;

/// Allowed clock skew between the `Date` header and wall-clock time.
pub const MAX_REQUEST_TIME_SKEW_SECONDS: i64 = 5 * 60;

/// `max_num_results` bounds (§4.4).
pub const MIN_MAX_NUM_RESULTS: u32 = 1;
pub const MAX_MAX_NUM_RESULTS: u32 = 50;

/// Name length bounds (§3).
pub const MIN_NAME_LEN: usize = 1;
pub const MAX_NAME_LEN: usize = 64;

/// Decoded image dimension bounds, applied to both the management API's
/// upload validator and the query API's query-image validator (§4.4). The
/// real service's exact numbers are not part of the distilled spec; these
/// are a documented decision (see `DESIGN.md`) rather than an inherited
/// constant.
pub const MIN_IMAGE_DIMENSION_PX: u32 = 1;
pub const MAX_IMAGE_DIMENSION_PX: u32 = 2048;
