// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! A mutable, process-wide set of databases (§3 Store, §5 Concurrency).
//!
//! The outer [`tokio::sync::RwLock`] is only ever held long enough to look
//! up or insert a database handle. Each database's own [`tokio::sync::Mutex`]
//! is held across the full "resolve -> validate -> mutate -> respond"
//! critical section for mutating endpoints, and released immediately after
//! cloning out a snapshot for read-only endpoints, so concurrent reads never
//! block on each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::database::Database;
use crate::error::StoreError;

#[derive(Clone)]
pub struct Store {
    databases: Arc<RwLock<HashMap<String, Arc<Mutex<Database>>>>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            databases: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clears all databases (`POST /reset`, §6).
    pub async fn reset(&self) {
        self.databases.write().await.clear();
    }

    /// Registers a new database. Enforces the four-keys-unique-across-the-store
    /// invariant (§3).
    pub async fn create_database(&self, database: Database) -> Result<(), StoreError> {
        let mut guard = self.databases.write().await;
        for existing in guard.values() {
            let existing = existing.lock().await;
            let c = &existing.credentials;
            let n = &database.credentials;
            if c.server_access_key == n.server_access_key {
                return Err(StoreError::DuplicateCredential(n.server_access_key.clone()));
            }
            if c.server_secret_key == n.server_secret_key {
                return Err(StoreError::DuplicateCredential(n.server_secret_key.clone()));
            }
            if c.client_access_key == n.client_access_key {
                return Err(StoreError::DuplicateCredential(n.client_access_key.clone()));
            }
            if c.client_secret_key == n.client_secret_key {
                return Err(StoreError::DuplicateCredential(n.client_secret_key.clone()));
            }
        }
        guard.insert(database.name.clone(), Arc::new(Mutex::new(database)));
        Ok(())
    }

    /// Returns a clone of every database, for snapshot-style reads (the
    /// query service's `get_all_databases()` equivalent, §4.6).
    pub async fn snapshot(&self) -> Vec<Database> {
        let guard = self.databases.read().await;
        let mut out = Vec::with_capacity(guard.len());
        for handle in guard.values() {
            out.push(handle.lock().await.clone());
        }
        out
    }

    /// Runs `f` against the named database under its exclusive lock,
    /// covering one full "resolve -> validate -> mutate -> respond" critical
    /// section (§5).
    pub async fn with_database<F, T>(&self, name: &str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Database) -> T,
    {
        let handle = {
            let guard = self.databases.read().await;
            guard
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::UnknownDatabase(name.to_string()))?
        };
        let mut database = handle.lock().await;
        Ok(f(&mut database))
    }

    /// Finds the database whose credentials match `access_key`, accepting
    /// either server or client keys depending on `allow_client_key` (§4.3).
    pub async fn find_by_access_key(
        &self,
        access_key: &str,
        allow_client_key: bool,
    ) -> Option<MatchedCredential> {
        let guard = self.databases.read().await;
        for (name, handle) in guard.iter() {
            let database = handle.lock().await;
            let c = &database.credentials;
            if c.server_access_key == access_key {
                return Some(MatchedCredential {
                    database_name: name.clone(),
                    secret_key: c.server_secret_key.clone(),
                });
            }
            if allow_client_key && c.client_access_key == access_key {
                return Some(MatchedCredential {
                    database_name: name.clone(),
                    secret_key: c.client_secret_key.clone(),
                });
            }
        }
        None
    }

    pub async fn create_target_fixture(
        &self,
        database_name: &str,
        id: String,
        name: String,
        width: f64,
        image: Vec<u8>,
        active_flag: bool,
        application_metadata: Option<String>,
        processing_time_seconds: f64,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError> {
        self.with_database(database_name, move |db| {
            db.create_target_fixture(
                id,
                name,
                width,
                image,
                active_flag,
                application_metadata,
                processing_time_seconds,
                now,
            )
        })
        .await?
    }

    pub async fn delete_target_fixture(
        &self,
        database_name: &str,
        target_id: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError> {
        self.with_database(database_name, move |db| db.delete_target(target_id, now))
            .await?
    }
}

pub struct MatchedCredential {
    pub database_name: String,
    pub secret_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ProjectState;
    use crate::database::Credentials;

    fn creds(tag: &str) -> Credentials {
        Credentials {
            server_access_key: format!("sak-{tag}"),
            server_secret_key: format!("ssk-{tag}"),
            client_access_key: format!("cak-{tag}"),
            client_secret_key: format!("csk-{tag}"),
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_credentials_across_databases() {
        let store = Store::new();
        store
            .create_database(Database::new(
                "a".into(),
                creds("x"),
                ProjectState::Working,
                0.2,
            ))
            .await
            .unwrap();
        let err = store
            .create_database(Database::new(
                "b".into(),
                creds("x"),
                ProjectState::Working,
                0.2,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCredential(_)));
    }

    #[tokio::test]
    async fn reset_clears_all_databases() {
        let store = Store::new();
        store
            .create_database(Database::new(
                "a".into(),
                creds("x"),
                ProjectState::Working,
                0.2,
            ))
            .await
            .unwrap();
        store.reset().await;
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn finds_database_by_server_key_only_when_client_keys_disallowed() {
        let store = Store::new();
        store
            .create_database(Database::new(
                "a".into(),
                creds("x"),
                ProjectState::Working,
                0.2,
            ))
            .await
            .unwrap();
        assert!(store.find_by_access_key("cak-x", false).await.is_none());
        assert!(store.find_by_access_key("cak-x", true).await.is_some());
        assert!(store.find_by_access_key("sak-x", false).await.is_some());
    }
}
