// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Target-manager client: the async, HTTP/JSON analogue of
//! `hdds-gateway::client::AdminClient`. Where `AdminClient` dials a TCP
//! socket and frames a binary command, `TargetManagerClient` issues one
//! `GET` against the target-manager's administrative snapshot endpoint and
//! deserializes straight into the domain's own `Database` type — there is
//! no wire protocol to hand-roll because both services already share
//! `ircloud-mock-core`.

use ircloud_mock_core::database::Database;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to target manager failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("target manager returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Fetches the full database snapshot from a target-manager service,
/// mirroring the distilled source's `get_all_databases()` call made on
/// every incoming query.
#[derive(Clone)]
pub struct TargetManagerClient {
    http: reqwest::Client,
    base_url: String,
}

impl TargetManagerClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn snapshot_url(&self) -> String {
        format!("{}/databases", self.base_url.trim_end_matches('/'))
    }

    /// `GET {base_url}/databases`: every database, targets included.
    pub async fn fetch_databases(&self) -> Result<Vec<Database>, ClientError> {
        let response = self.http.get(self.snapshot_url()).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}
