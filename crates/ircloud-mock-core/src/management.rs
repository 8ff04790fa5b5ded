// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Target-manager domain operations (§4.5), wrapping [`Store`]/[`Database`]
//! calls with the exact response shapes the VWS handlers need. This module
//! knows nothing about HTTP; the binary crate's handlers translate these
//! results into responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::{ResultCode, TargetStatus};
use crate::database::{Database, StatusSummary};
use crate::error::Failure;
use crate::image::{ImageMatcher, TargetRater};
use crate::store::Store;
use crate::target::Target;
use crate::validators::vws::ValidatedTargetFields;

fn fail(status: u16, code: ResultCode) -> Failure {
    Failure::json_result(status, code)
}

#[derive(Debug, Serialize)]
pub struct CreatedTarget {
    pub result_code: &'static str,
    pub transaction_id: String,
    pub target_id: String,
}

/// `POST /targets` (§4.5).
pub async fn create_target(
    store: &Store,
    database_name: &str,
    fields: ValidatedTargetFields,
    now: DateTime<Utc>,
) -> Result<CreatedTarget, Failure> {
    let name = fields.name.expect("validated by validate_create_body");
    let width = fields.width.expect("validated by validate_create_body");
    let image = fields.image.expect("validated by validate_create_body");
    let active_flag = fields.active_flag.unwrap_or(true);

    let target_id = store
        .with_database(database_name, move |db| {
            db.create_target(
                name,
                width,
                image,
                active_flag,
                fields.application_metadata,
                now,
            )
        })
        .await
        .map_err(|_| fail(400, ResultCode::Fail))?
        .map_err(|_| fail(403, ResultCode::TargetNameExist))?;

    Ok(CreatedTarget {
        result_code: ResultCode::TargetCreated.as_str(),
        transaction_id: crate::ids::new_hex_id(),
        target_id,
    })
}

#[derive(Debug, Serialize)]
pub struct TargetList {
    pub result_code: &'static str,
    pub transaction_id: String,
    pub results: Vec<String>,
}

/// `GET /targets` (§4.5): every non-deleted target identifier, regardless
/// of the query-side deletion-window hiding.
pub async fn list_targets(store: &Store, database_name: &str) -> Result<TargetList, Failure> {
    let ids = store
        .with_database(database_name, |db| {
            db.targets()
                .iter()
                .filter(|t| !t.is_deleted())
                .map(|t| t.id.clone())
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|_| fail(400, ResultCode::Fail))?;

    Ok(TargetList {
        result_code: ResultCode::Success.as_str(),
        transaction_id: crate::ids::new_hex_id(),
        results: ids,
    })
}

#[derive(Debug, Serialize)]
pub struct TargetRecord {
    pub result_code: &'static str,
    pub transaction_id: String,
    pub target_record: TargetRecordBody,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TargetRecordBody {
    pub target_id: String,
    pub active_flag: bool,
    pub name: String,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_rating: Option<i32>,
}

/// `GET /targets/{id}` (§4.5).
pub async fn get_target(
    store: &Store,
    database_name: &str,
    target_id: &str,
    rater: &dyn TargetRater,
    now: DateTime<Utc>,
) -> Result<TargetRecord, Failure> {
    let found = store
        .with_database(database_name, move |db| {
            db.finalize_processing(rater, now);
            db.target(target_id)
                .filter(|t| t.management_visible())
                .map(|t| to_record(t, now))
        })
        .await
        .map_err(|_| fail(400, ResultCode::Fail))?;

    found.ok_or_else(|| fail(404, ResultCode::UnknownTarget))
}

fn to_record(target: &Target, now: DateTime<Utc>) -> TargetRecord {
    let status = target.status(now);
    let tracking_rating = if status == TargetStatus::Processing {
        None
    } else {
        Some(target.reco_rating.unwrap_or(-1))
    };
    TargetRecord {
        result_code: ResultCode::Success.as_str(),
        transaction_id: crate::ids::new_hex_id(),
        target_record: TargetRecordBody {
            target_id: target.id.clone(),
            active_flag: target.active_flag,
            name: target.name.clone(),
            width: target.width,
            tracking_rating,
        },
        status: status.as_str(),
    }
}

/// `PUT /targets/{id}` (§4.5): permitted only while `status = success`;
/// reopens the target into a fresh processing window when the image
/// changes.
pub async fn update_target(
    store: &Store,
    database_name: &str,
    target_id: &str,
    fields: ValidatedTargetFields,
    rater: &dyn TargetRater,
    now: DateTime<Utc>,
) -> Result<(), Failure> {
    let outcome = store
        .with_database(database_name, move |db| {
            db.finalize_processing(rater, now);
            apply_update(db, target_id, fields, now)
        })
        .await
        .map_err(|_| fail(400, ResultCode::UnknownTarget))?;
    outcome
}

fn apply_update(
    db: &mut Database,
    target_id: &str,
    fields: ValidatedTargetFields,
    now: DateTime<Utc>,
) -> Result<(), Failure> {
    if let Some(new_name) = &fields.name {
        if db.name_taken(new_name, Some(target_id)) {
            return Err(fail(403, ResultCode::TargetNameExist));
        }
    }

    let status = db
        .target(target_id)
        .ok_or_else(|| fail(404, ResultCode::UnknownTarget))?
        .status(now);
    if status != TargetStatus::Success && status != TargetStatus::Failed {
        return Err(fail(403, ResultCode::TargetStatusNotSuccess));
    }

    let target = db
        .target_mut(target_id)
        .ok_or_else(|| fail(404, ResultCode::UnknownTarget))?;
    if let Some(name) = fields.name {
        target.name = name;
    }
    if let Some(width) = fields.width {
        target.width = width;
    }
    if let Some(active_flag) = fields.active_flag {
        target.active_flag = active_flag;
    }
    if let Some(metadata) = fields.application_metadata {
        target.application_metadata = Some(metadata);
    }
    if let Some(image) = fields.image {
        target.replace_image(image, now);
    } else {
        target.touch(now);
    }
    Ok(())
}

/// `DELETE /targets/{id}` (§4.5).
pub async fn delete_target(
    store: &Store,
    database_name: &str,
    target_id: &str,
    now: DateTime<Utc>,
) -> Result<(), Failure> {
    let already_visible = store
        .with_database(database_name, move |db| {
            db.target(target_id).map(|t| t.management_visible())
        })
        .await
        .map_err(|_| fail(400, ResultCode::UnknownTarget))?;
    if already_visible != Some(true) {
        return Err(fail(404, ResultCode::UnknownTarget));
    }

    store
        .with_database(database_name, move |db| db.delete_target(target_id, now))
        .await
        .map_err(|_| fail(404, ResultCode::UnknownTarget))?
        .map_err(|_| fail(404, ResultCode::UnknownTarget))
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub result_code: &'static str,
    pub transaction_id: String,
    #[serde(flatten)]
    pub counts: StatusSummary,
}

/// `GET /summary` (§4.5).
pub async fn database_summary(
    store: &Store,
    database_name: &str,
    rater: &dyn TargetRater,
    now: DateTime<Utc>,
) -> Result<Summary, Failure> {
    let counts = store
        .with_database(database_name, move |db| {
            db.finalize_processing(rater, now);
            db.status_summary(now)
        })
        .await
        .map_err(|_| fail(400, ResultCode::Fail))?;
    Ok(Summary {
        result_code: ResultCode::Success.as_str(),
        transaction_id: crate::ids::new_hex_id(),
        counts,
    })
}

#[derive(Debug, Serialize)]
pub struct TargetSummary {
    pub result_code: &'static str,
    pub transaction_id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_rating: Option<i32>,
}

/// `GET /targets/{id}/summary` (§4.5): the tracking rating is present only
/// once the target has left `processing`.
pub async fn target_summary(
    store: &Store,
    database_name: &str,
    target_id: &str,
    rater: &dyn TargetRater,
    now: DateTime<Utc>,
) -> Result<TargetSummary, Failure> {
    let found = store
        .with_database(database_name, move |db| {
            db.finalize_processing(rater, now);
            db.target(target_id)
                .filter(|t| t.management_visible())
                .map(|t| {
                    let status = t.status(now);
                    let tracking_rating = if status == TargetStatus::Processing {
                        None
                    } else {
                        Some(t.reco_rating.unwrap_or(-1))
                    };
                    (status, tracking_rating)
                })
        })
        .await
        .map_err(|_| fail(400, ResultCode::Fail))?;

    let (status, tracking_rating) = found.ok_or_else(|| fail(404, ResultCode::UnknownTarget))?;
    Ok(TargetSummary {
        result_code: ResultCode::Success.as_str(),
        transaction_id: crate::ids::new_hex_id(),
        status: status.as_str(),
        tracking_rating,
    })
}

#[derive(Debug, Serialize)]
pub struct Duplicates {
    pub result_code: &'static str,
    pub transaction_id: String,
    pub similar_targets: Vec<String>,
}

/// `GET /duplicates/{id}` (§4.5).
pub async fn duplicates(
    store: &Store,
    database_name: &str,
    target_id: &str,
    matcher: &dyn ImageMatcher,
    rater: &dyn TargetRater,
    now: DateTime<Utc>,
) -> Result<Duplicates, Failure> {
    let result = store
        .with_database(database_name, |db| {
            db.finalize_processing(rater, now);
            db.duplicates_of(target_id, matcher, now)
        })
        .await
        .map_err(|_| fail(400, ResultCode::Fail))?;

    let ids = result.map_err(|_| fail(404, ResultCode::UnknownTarget))?;
    Ok(Duplicates {
        result_code: ResultCode::Success.as_str(),
        transaction_id: crate::ids::new_hex_id(),
        similar_targets: ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ProjectState;
    use crate::database::{Credentials, Database};
    use crate::image::ExactMatcher;

    fn creds() -> Credentials {
        Credentials {
            server_access_key: "sak".into(),
            server_secret_key: "ssk".into(),
            client_access_key: "cak".into(),
            client_secret_key: "csk".into(),
        }
    }

    async fn store_with_db(name: &str) -> Store {
        let store = Store::new();
        store
            .create_database(Database::new(name.into(), creds(), ProjectState::Working, 0.0))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = store_with_db("db").await;
        let now = Utc::now();
        let fields = ValidatedTargetFields {
            name: Some("t".into()),
            width: Some(1.0),
            image: Some(vec![1, 2, 3]),
            active_flag: None,
            application_metadata: None,
        };
        let created = create_target(&store, "db", fields, now).await.unwrap();

        let record = get_target(&store, "db", &created.target_id, &crate::image::RandomRater, now)
            .await
            .unwrap();
        assert_eq!(record.target_record.target_id, created.target_id);
    }

    #[tokio::test]
    async fn duplicate_name_is_forbidden() {
        let store = store_with_db("db").await;
        let now = Utc::now();
        let fields = ValidatedTargetFields {
            name: Some("t".into()),
            width: Some(1.0),
            image: Some(vec![1]),
            active_flag: None,
            application_metadata: None,
        };
        create_target(&store, "db", fields.clone(), now).await.unwrap();
        let err = create_target(&store, "db", fields, now).await.unwrap_err();
        assert_eq!(err.status, 403);
    }

    #[tokio::test]
    async fn update_rejected_while_processing() {
        let store = Store::new();
        store
            .create_database(Database::new("db".into(), creds(), ProjectState::Working, 10.0))
            .await
            .unwrap();
        let now = Utc::now();
        let fields = ValidatedTargetFields {
            name: Some("t".into()),
            width: Some(1.0),
            image: Some(vec![1]),
            active_flag: None,
            application_metadata: None,
        };
        let created = create_target(&store, "db", fields, now).await.unwrap();

        let update = ValidatedTargetFields {
            active_flag: Some(false),
            ..Default::default()
        };
        let err = update_target(
            &store,
            "db",
            &created.target_id,
            update,
            &crate::image::RandomRater,
            now,
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, 403);
    }

    #[tokio::test]
    async fn deleted_target_hidden_from_get() {
        let store = store_with_db("db").await;
        let now = Utc::now();
        let fields = ValidatedTargetFields {
            name: Some("t".into()),
            width: Some(1.0),
            image: Some(vec![1]),
            active_flag: None,
            application_metadata: None,
        };
        let created = create_target(&store, "db", fields, now).await.unwrap();
        delete_target(&store, "db", &created.target_id, now).await.unwrap();

        let err = get_target(&store, "db", &created.target_id, &crate::image::RandomRater, now)
            .await
            .unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[tokio::test]
    async fn duplicates_excludes_self_and_requires_success() {
        let store = store_with_db("db").await;
        let now = Utc::now();
        let a = create_target(
            &store,
            "db",
            ValidatedTargetFields {
                name: Some("a".into()),
                width: Some(1.0),
                image: Some(vec![9]),
                active_flag: None,
                application_metadata: None,
            },
            now,
        )
        .await
        .unwrap();
        let b = create_target(
            &store,
            "db",
            ValidatedTargetFields {
                name: Some("b".into()),
                width: Some(1.0),
                image: Some(vec![9]),
                active_flag: None,
                application_metadata: None,
            },
            now,
        )
        .await
        .unwrap();
        store
            .with_database("db", |db| db.finalize_processing(&crate::image::RandomRater, now))
            .await
            .unwrap();

        let found = duplicates(
            &store,
            "db",
            &a.target_id,
            &ExactMatcher,
            &crate::image::RandomRater,
            now,
        )
        .await
        .unwrap();
        assert_eq!(found.similar_targets, vec![b.target_id]);
    }
}
