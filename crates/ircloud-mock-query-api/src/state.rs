// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared application state for the query service.

use std::sync::Arc;

use chrono::Duration;
use ircloud_mock_core::clock::Clock;
use ircloud_mock_core::image::{ImageMatcher, TargetRater};

use crate::client::TargetManagerClient;

pub struct AppState {
    pub target_manager: TargetManagerClient,
    pub clock: Arc<dyn Clock>,
    pub query_matcher: Box<dyn ImageMatcher>,
    pub rater: Box<dyn TargetRater>,
    pub recognition_window: Duration,
    pub processing_window: Duration,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        target_manager: TargetManagerClient,
        clock: Arc<dyn Clock>,
        query_matcher: Box<dyn ImageMatcher>,
        rater: Box<dyn TargetRater>,
        deletion_recognition_seconds: f64,
        deletion_processing_seconds: f64,
    ) -> Self {
        Self {
            target_manager,
            clock,
            query_matcher,
            rater,
            recognition_window: Duration::milliseconds(
                (deletion_recognition_seconds * 1000.0) as i64,
            ),
            processing_window: Duration::milliseconds(
                (deletion_processing_seconds * 1000.0) as i64,
            ),
        }
    }
}
