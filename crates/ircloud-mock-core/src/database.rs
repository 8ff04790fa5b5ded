// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Credentials, target collection, project state for one tenant (§3).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ProjectState, TargetStatus};
use crate::error::StoreError;
use crate::image::matcher::decode;
use crate::image::{ImageMatcher, TargetRater};
use crate::target::{DeletionPhase, Target};

/// The four credential strings that identify a database to inbound requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub server_access_key: String,
    pub server_secret_key: String,
    pub client_access_key: String,
    pub client_secret_key: String,
}

/// A named tenant holding targets and four credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    pub credentials: Credentials,
    pub state: ProjectState,
    pub default_processing_time_seconds: f64,
    targets: Vec<Target>,
}

impl Database {
    pub fn new(
        name: String,
        credentials: Credentials,
        state: ProjectState,
        default_processing_time_seconds: f64,
    ) -> Self {
        Self {
            name,
            credentials,
            state,
            default_processing_time_seconds,
            targets: Vec::new(),
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, id: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn target_mut(&mut self, id: &str) -> Option<&mut Target> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn name_taken(&self, name: &str, excluding_id: Option<&str>) -> bool {
        self.targets
            .iter()
            .any(|t| t.name == name && !t.is_deleted() && Some(t.id.as_str()) != excluding_id)
    }

    /// Production-facing creation path: server-assigns the identifier and
    /// always uses the database's configured processing time (§4.5 `POST
    /// /targets`).
    pub fn create_target(
        &mut self,
        name: String,
        width: f64,
        image: Vec<u8>,
        active_flag: bool,
        application_metadata: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        if self.name_taken(&name, None) {
            return Err(StoreError::DuplicateName(name));
        }
        let id = crate::ids::new_hex_id();
        self.insert_target(
            id.clone(),
            name,
            width,
            image,
            active_flag,
            application_metadata,
            self.default_processing_time_seconds,
            now,
        )?;
        Ok(id)
    }

    /// Administrative fixture path: caller supplies the identifier and
    /// processing time directly, for deterministic test setup (SPEC_FULL §4
    /// supplement).
    #[allow(clippy::too_many_arguments)]
    pub fn create_target_fixture(
        &mut self,
        id: String,
        name: String,
        width: f64,
        image: Vec<u8>,
        active_flag: bool,
        application_metadata: Option<String>,
        processing_time_seconds: f64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.insert_target(
            id,
            name,
            width,
            image,
            active_flag,
            application_metadata,
            processing_time_seconds,
            now,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_target(
        &mut self,
        id: String,
        name: String,
        width: f64,
        image: Vec<u8>,
        active_flag: bool,
        application_metadata: Option<String>,
        processing_time_seconds: f64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.name_taken(&name, None) {
            return Err(StoreError::DuplicateName(name));
        }
        self.targets.push(Target {
            id,
            name,
            width,
            image,
            active_flag,
            application_metadata,
            created: now,
            last_modified: now,
            delete_date: None,
            processing_time_seconds,
            reco_rating: None,
            image_is_decodable: None,
        });
        Ok(())
    }

    pub fn delete_target(&mut self, id: &str, now: DateTime<Utc>) -> Result<(), StoreError> {
        let target = self
            .target_mut(id)
            .ok_or_else(|| StoreError::UnknownTarget(id.to_string()))?;
        target.delete_date = Some(now);
        target.last_modified = now;
        Ok(())
    }

    /// Run the one-shot processing finalization (decode + rate) for every
    /// target whose processing window has elapsed but has not yet been
    /// finalized. Idempotent; cheap to call on every read.
    pub fn finalize_processing(&mut self, rater: &dyn TargetRater, now: DateTime<Utc>) {
        for target in &mut self.targets {
            if target.image_is_decodable.is_some() {
                continue;
            }
            let elapsed = now - target.created;
            let window =
                Duration::milliseconds((target.processing_time_seconds * 1000.0) as i64);
            if elapsed < window {
                continue;
            }
            let decodable = decode(&target.image).is_some();
            target.image_is_decodable = Some(decodable);
            target.reco_rating = Some(if decodable {
                rater.rate(&target.id, &target.image)
            } else {
                -1
            });
        }
    }

    /// Targets whose image matches `subject`'s image (§4.5 `GET
    /// /duplicates/{id}`): status success, not deleted, active, excluding
    /// the subject itself.
    pub fn duplicates_of(
        &self,
        subject_id: &str,
        matcher: &dyn ImageMatcher,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, StoreError> {
        let subject = self
            .target(subject_id)
            .ok_or_else(|| StoreError::UnknownTarget(subject_id.to_string()))?;
        let subject_image = subject.image.clone();
        Ok(self
            .targets
            .iter()
            .filter(|t| t.id != subject_id)
            .filter(|t| t.status(now) == TargetStatus::Success)
            .filter(|t| !t.is_deleted())
            .filter(|t| t.active_flag)
            .filter(|t| matcher.matches(&t.image, &subject_image))
            .map(|t| t.id.clone())
            .collect())
    }

    /// Per-status counts (§4.5 `GET /summary`).
    pub fn status_summary(&self, now: DateTime<Utc>) -> StatusSummary {
        let mut summary = StatusSummary::default();
        for target in self.targets.iter().filter(|t| t.management_visible()) {
            match target.status(now) {
                TargetStatus::Processing => summary.processing += 1,
                TargetStatus::Success => summary.success += 1,
                TargetStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Query-side matching candidate set (§4.6 step 3): anything not yet
    /// fully gone past both deletion windows.
    pub fn query_candidates(
        &self,
        recognition_window: Duration,
        processing_window: Duration,
        now: DateTime<Utc>,
    ) -> Vec<&Target> {
        self.targets
            .iter()
            .filter(|t| {
                if !t.is_deleted() {
                    return true;
                }
                t.deletion_phase(now, recognition_window, processing_window)
                    != DeletionPhase::FullyGone
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub processing: u32,
    pub success: u32,
    pub failed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::RandomRater;

    fn creds(tag: &str) -> Credentials {
        Credentials {
            server_access_key: format!("sak-{tag}"),
            server_secret_key: format!("ssk-{tag}"),
            client_access_key: format!("cak-{tag}"),
            client_secret_key: format!("csk-{tag}"),
        }
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut db = Database::new("db".into(), creds("a"), ProjectState::Working, 0.5);
        let now = Utc::now();
        db.create_target("same".into(), 1.0, vec![1], true, None, now)
            .unwrap();
        let err = db
            .create_target("same".into(), 1.0, vec![2], true, None, now)
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(_)));
    }

    #[test]
    fn processing_then_finalized() {
        let mut db = Database::new("db".into(), creds("a"), ProjectState::Working, 1.0);
        let now = Utc::now();
        let id = db
            .create_target("t".into(), 1.0, vec![0xff, 0xd8], true, None, now)
            .unwrap();
        assert_eq!(db.target(&id).unwrap().status(now), TargetStatus::Processing);

        let later = now + Duration::seconds(2);
        db.finalize_processing(&RandomRater, later);
        // Garbage bytes never decode, so this finalizes to `failed`.
        assert_eq!(db.target(&id).unwrap().status(later), TargetStatus::Failed);
        assert_eq!(db.target(&id).unwrap().reco_rating, Some(-1));
    }
}
