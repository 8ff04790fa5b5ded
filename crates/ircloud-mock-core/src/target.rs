// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-target state, lifecycle timestamps and the derived-status rule (§3, §4.7).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::TargetStatus;

/// A registered image plus metadata, intended to be recognized later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub image: Vec<u8>,
    pub active_flag: bool,
    /// Base64 text, already re-encodable; `None` if never set.
    pub application_metadata: Option<String>,
    pub created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub delete_date: Option<DateTime<Utc>>,
    pub processing_time_seconds: f64,
    /// -1..=5. Fixed once processing completes; reset to pending (None) on
    /// an image update until the next processing window finishes.
    pub reco_rating: Option<i32>,
    /// Set once, the first time processing completes, to record whether the
    /// image actually decoded. Drives the `success` vs `failed` split.
    pub image_is_decodable: Option<bool>,
}

impl Target {
    /// Derived lifecycle status as of `now` (§3, §4.7). A deleted target
    /// continues to report a pre-deletion status internally; callers that
    /// need the "visible as deleted" rule use [`Target::management_visible`]
    /// or [`Target::query_eligible`] instead of raw status.
    pub fn status(&self, now: DateTime<Utc>) -> TargetStatus {
        let elapsed = now - self.created;
        let processing_window = Duration::milliseconds((self.processing_time_seconds * 1000.0) as i64);
        if elapsed < processing_window {
            return TargetStatus::Processing;
        }
        match self.image_is_decodable {
            Some(true) => TargetStatus::Success,
            Some(false) => TargetStatus::Failed,
            // Processing window elapsed but the one-shot decode/rate check
            // has not run yet; treat as still processing until the store
            // finalizes it (see `Database::finalize_processing`).
            None => TargetStatus::Processing,
        }
    }

    /// `true` once the target has been deleted, regardless of the query-side
    /// recognition/delete-processing windows.
    pub fn is_deleted(&self) -> bool {
        self.delete_date.is_some()
    }

    /// Management API visibility rule (§4.5 `GET /targets/{id}`): a deleted
    /// target disappears immediately.
    pub fn management_visible(&self) -> bool {
        !self.is_deleted()
    }

    /// Query-side deletion partition (§4.6 step 4).
    pub fn deletion_phase(
        &self,
        now: DateTime<Utc>,
        recognition_window: Duration,
        processing_window: Duration,
    ) -> DeletionPhase {
        let Some(delete_date) = self.delete_date else {
            return DeletionPhase::NotDeleted;
        };
        let since_delete = now - delete_date;
        if since_delete < recognition_window {
            DeletionPhase::NotYetRecognized
        } else if since_delete < recognition_window + processing_window {
            DeletionPhase::DeleteProcessing
        } else {
            DeletionPhase::FullyGone
        }
    }

    /// Apply a fresh image, resetting the target back into its processing
    /// window (§4.5 `PUT /targets/{id}`, §4.7).
    pub fn replace_image(&mut self, image: Vec<u8>, now: DateTime<Utc>) {
        self.image = image;
        self.created = now;
        self.last_modified = now;
        self.image_is_decodable = None;
        self.reco_rating = None;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }
}

/// Where a deleted target sits relative to the query-visible deletion windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPhase {
    NotDeleted,
    NotYetRecognized,
    DeleteProcessing,
    FullyGone,
}
