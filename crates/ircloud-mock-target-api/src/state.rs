// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared application state for the target-manager service.

use std::sync::Arc;

use ircloud_mock_core::clock::Clock;
use ircloud_mock_core::image::{ImageMatcher, TargetRater};
use ircloud_mock_core::store::Store;

pub struct AppState {
    pub store: Store,
    pub clock: Arc<dyn Clock>,
    /// Matcher used by `GET /duplicates/{id}` (§4.5). The query-side matcher
    /// is configured separately, in the query-api process.
    pub duplicate_matcher: Box<dyn ImageMatcher>,
    /// Rater used to finalize a target's processing window on every read
    /// that reports status or tracking rating.
    pub rater: Box<dyn TargetRater>,
}

impl AppState {
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        duplicate_matcher: Box<dyn ImageMatcher>,
        rater: Box<dyn TargetRater>,
    ) -> Self {
        Self {
            store,
            clock,
            duplicate_matcher,
            rater,
        }
    }
}
