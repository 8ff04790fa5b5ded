// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque 32-hex identifier generation (target IDs, transaction IDs, query IDs).

use uuid::Uuid;

/// A fresh 32-character lowercase hex string, e.g. a `target_id` or
/// `transaction_id`. Matches the real service's `uuid4().hex` convention.
pub fn new_hex_id() -> String {
    Uuid::new_v4().simple().to_string()
}
