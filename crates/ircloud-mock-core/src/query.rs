// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The query-matching engine (§4.6): partitions candidate targets by
//! derived deletion/processing state, decides between the canned
//! match-processing response and a ranked result set, and renders the
//! successful result body.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::constants::{IncludeTargetData, TargetStatus};
use crate::database::Database;
use crate::image::ImageMatcher;
use crate::target::{DeletionPhase, Target};

/// The canned body the real service sends while a match is still being
/// decided server-side. Kept byte-identical across requests (§4.6 step 5)
/// rather than reproducing the real service's non-determinism.
pub const MATCH_PROCESSING_BODY: &str = "<!DOCTYPE html>\n<html><head><title>500 Internal Server Error</title></head>\n<body><h1>Internal Server Error</h1><p>The server encountered an internal error and was unable to complete your request.</p></body></html>\n";

/// Windows controlling the deletion and processing partitions, sourced from
/// configuration rather than hard-coded (§6, resolving the source's
/// `query_processes_deletion_seconds` TODO).
#[derive(Debug, Clone, Copy)]
pub struct QueryWindows {
    pub recognition_window: Duration,
    pub processing_window: Duration,
}

/// Outcome of running a query against one database.
pub enum QueryOutcome {
    /// A match is still being decided; render the canned 500.
    MatchProcessing,
    /// The final, ranked result set.
    Matched(QueryResults),
}

#[derive(Debug, Serialize)]
pub struct QueryResults {
    pub result_code: &'static str,
    pub query_id: String,
    pub results: Vec<QueryResultEntry>,
}

#[derive(Debug, Serialize)]
pub struct QueryResultEntry {
    pub target_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_data: Option<TargetData>,
}

#[derive(Debug, Serialize)]
pub struct TargetData {
    pub target_timestamp: i64,
    pub name: String,
    pub application_metadata: Option<String>,
}

/// Runs the full match-and-rank algorithm against `database` (§4.6 steps 3-8).
pub fn run_query(
    database: &Database,
    matcher: &dyn ImageMatcher,
    query_image: &[u8],
    max_num_results: u32,
    include_target_data: IncludeTargetData,
    windows: QueryWindows,
    now: DateTime<Utc>,
) -> QueryOutcome {
    let candidates: Vec<&Target> = database
        .query_candidates(windows.recognition_window, windows.processing_window, now)
        .into_iter()
        .filter(|t| is_candidate_status(t, now))
        .filter(|t| matcher.matches(&t.image, query_image))
        .collect();

    let mut not_deleted_matches = Vec::new();
    let mut deletion_not_recognized = Vec::new();
    let mut delete_processing = Vec::new();
    let mut processing_matches = Vec::new();

    for target in candidates {
        if target.status(now) == TargetStatus::Processing {
            processing_matches.push(target);
            continue;
        }
        match target.deletion_phase(now, windows.recognition_window, windows.processing_window) {
            DeletionPhase::NotDeleted => {
                if target.active_flag && target.status(now) == TargetStatus::Success {
                    not_deleted_matches.push(target);
                }
            }
            DeletionPhase::NotYetRecognized => {
                if target.active_flag {
                    deletion_not_recognized.push(target);
                }
            }
            DeletionPhase::DeleteProcessing => {
                if target.active_flag {
                    delete_processing.push(target);
                }
            }
            DeletionPhase::FullyGone => {}
        }
    }

    if !processing_matches.is_empty() || !delete_processing.is_empty() {
        return QueryOutcome::MatchProcessing;
    }

    let mut matched: Vec<&Target> = not_deleted_matches
        .into_iter()
        .chain(deletion_not_recognized)
        .collect();
    matched.sort_by(|a, b| {
        b.reco_rating
            .unwrap_or(-1)
            .cmp(&a.reco_rating.unwrap_or(-1))
            .then_with(|| b.last_modified.cmp(&a.last_modified))
    });
    matched.truncate(max_num_results as usize);

    let results = matched
        .iter()
        .enumerate()
        .map(|(i, target)| {
            let attach = match include_target_data {
                IncludeTargetData::All => true,
                IncludeTargetData::Top => i == 0,
                IncludeTargetData::None => false,
            };
            QueryResultEntry {
                target_id: target.id.clone(),
                target_data: attach.then(|| TargetData {
                    target_timestamp: target.last_modified.timestamp(),
                    name: target.name.clone(),
                    application_metadata: target.application_metadata.clone(),
                }),
            }
        })
        .collect();

    QueryOutcome::Matched(QueryResults {
        result_code: "Success",
        query_id: crate::ids::new_hex_id(),
        results,
    })
}

/// Whether a target's status even makes it eligible for matching at all
/// (§4.6 step 3): `success`, `processing`, or still within a deletion window.
fn is_candidate_status(target: &Target, now: DateTime<Utc>) -> bool {
    matches!(
        target.status(now),
        TargetStatus::Success | TargetStatus::Processing
    ) || target.is_deleted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ProjectState;
    use crate::database::Credentials;
    use crate::image::ExactMatcher;

    fn creds() -> Credentials {
        Credentials {
            server_access_key: "sak".into(),
            server_secret_key: "ssk".into(),
            client_access_key: "cak".into(),
            client_secret_key: "csk".into(),
        }
    }

    fn windows() -> QueryWindows {
        QueryWindows {
            recognition_window: Duration::milliseconds(200),
            processing_window: Duration::milliseconds(3000),
        }
    }

    #[test]
    fn processing_target_triggers_match_processing() {
        let mut db = Database::new("db".into(), creds(), ProjectState::Working, 5.0);
        let now = Utc::now();
        db.create_target("t".into(), 1.0, vec![1, 2, 3], true, None, now)
            .unwrap();
        let outcome = run_query(
            &db,
            &ExactMatcher,
            &[1, 2, 3],
            1,
            IncludeTargetData::Top,
            windows(),
            now,
        );
        assert!(matches!(outcome, QueryOutcome::MatchProcessing));
    }

    #[test]
    fn finalized_success_target_matches() {
        let mut db = Database::new("db".into(), creds(), ProjectState::Working, 0.0);
        let now = Utc::now();
        let id = db
            .create_target("t".into(), 1.0, vec![1, 2, 3], true, None, now)
            .unwrap();
        db.finalize_processing(&crate::image::RandomRater, now);

        match run_query(
            &db,
            &ExactMatcher,
            &[1, 2, 3],
            1,
            IncludeTargetData::Top,
            windows(),
            now,
        ) {
            QueryOutcome::Matched(results) => {
                assert_eq!(results.results.len(), 1);
                assert_eq!(results.results[0].target_id, id);
                assert!(results.results[0].target_data.is_some());
            }
            QueryOutcome::MatchProcessing => panic!("expected a match"),
        }
    }

    #[test]
    fn deleted_within_recognition_window_still_matches() {
        let mut db = Database::new("db".into(), creds(), ProjectState::Working, 0.0);
        let now = Utc::now();
        let id = db
            .create_target("t".into(), 1.0, vec![9], true, None, now)
            .unwrap();
        db.finalize_processing(&crate::image::RandomRater, now);
        db.delete_target(&id, now).unwrap();

        let later = now + Duration::milliseconds(50);
        match run_query(
            &db,
            &ExactMatcher,
            &[9],
            1,
            IncludeTargetData::None,
            windows(),
            later,
        ) {
            QueryOutcome::Matched(results) => assert_eq!(results.results.len(), 1),
            QueryOutcome::MatchProcessing => panic!("expected a match within recognition window"),
        }
    }

    #[test]
    fn deleted_past_recognition_but_within_delete_processing_triggers_processing_response() {
        let mut db = Database::new("db".into(), creds(), ProjectState::Working, 0.0);
        let now = Utc::now();
        let id = db
            .create_target("t".into(), 1.0, vec![9], true, None, now)
            .unwrap();
        db.finalize_processing(&crate::image::RandomRater, now);
        db.delete_target(&id, now).unwrap();

        let later = now + Duration::milliseconds(500);
        let outcome = run_query(
            &db,
            &ExactMatcher,
            &[9],
            1,
            IncludeTargetData::None,
            windows(),
            later,
        );
        assert!(matches!(outcome, QueryOutcome::MatchProcessing));
    }

    #[test]
    fn deleted_past_both_windows_is_fully_gone() {
        let mut db = Database::new("db".into(), creds(), ProjectState::Working, 0.0);
        let now = Utc::now();
        let id = db
            .create_target("t".into(), 1.0, vec![9], true, None, now)
            .unwrap();
        db.finalize_processing(&crate::image::RandomRater, now);
        db.delete_target(&id, now).unwrap();

        let later = now + Duration::seconds(10);
        match run_query(
            &db,
            &ExactMatcher,
            &[9],
            1,
            IncludeTargetData::None,
            windows(),
            later,
        ) {
            QueryOutcome::Matched(results) => assert!(results.results.is_empty()),
            QueryOutcome::MatchProcessing => panic!("fully-gone target should not block matching"),
        }
    }

    #[test]
    fn results_truncated_and_ranked_by_rating_then_recency() {
        let mut db = Database::new("db".into(), creds(), ProjectState::Working, 0.0);
        let now = Utc::now();
        let a = db
            .create_target("a".into(), 1.0, vec![9], true, None, now)
            .unwrap();
        let b = db
            .create_target("b".into(), 1.0, vec![9], true, None, now + Duration::seconds(1))
            .unwrap();
        db.finalize_processing(&crate::image::RandomRater, now + Duration::seconds(1));
        // Force a deterministic ordering: give both targets the same rating
        // so the tiebreak (last_modified desc) must decide, putting b first.
        if let Some(t) = db.target_mut(&a) {
            t.reco_rating = Some(3);
        }
        if let Some(t) = db.target_mut(&b) {
            t.reco_rating = Some(3);
        }

        match run_query(
            &db,
            &ExactMatcher,
            &[9],
            1,
            IncludeTargetData::None,
            windows(),
            now + Duration::seconds(1),
        ) {
            QueryOutcome::Matched(results) => {
                assert_eq!(results.results.len(), 1);
                assert_eq!(results.results[0].target_id, b);
            }
            QueryOutcome::MatchProcessing => panic!("expected a match"),
        }
    }
}
