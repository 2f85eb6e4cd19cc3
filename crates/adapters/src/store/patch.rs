// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::StoreError;
use snooze_core::{ManagedResource, PatchKind};
use serde_json::Value;

/// Apply a raw patch document to a resource.
///
/// Stores carry no schema, so strategic merge patches are applied as plain
/// JSON merge patches. JSON (RFC 6902) patches are not supported.
pub fn apply_patch(
    resource: &ManagedResource,
    kind: PatchKind,
    data: &[u8],
) -> Result<ManagedResource, StoreError> {
    if kind == PatchKind::Json {
        return Err(StoreError::UnsupportedPatch(kind));
    }
    let patch: Value =
        serde_json::from_slice(data).map_err(|e| StoreError::InvalidPatch(e.to_string()))?;
    if !patch.is_object() {
        return Err(StoreError::InvalidPatch(
            "patch document must be a JSON object".to_string(),
        ));
    }
    resource
        .apply_merge_patch(&patch)
        .map_err(|e| StoreError::InvalidPatch(e.to_string()))
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
