// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup records stored as annotations on the resource itself

use crate::error::AdapterError;
use serde_json::{Map, Value};
use snooze_adapters::ResourceStore;
use snooze_core::{AnnotationKeys, ManagedResource};
use std::fmt::Display;

/// Full-state backup is on for the whole window or opted into per resource
pub(crate) fn wants_full_state(
    resource: &ManagedResource,
    keys: &AnnotationKeys,
    window_full_state: bool,
) -> bool {
    window_full_state || resource.annotation(&keys.full_state) == Some("true")
}

/// Store the serialized `spec` under the state key
pub(crate) fn record_spec(
    resource: &mut ManagedResource,
    keys: &AnnotationKeys,
) -> Result<(), AdapterError> {
    let state = serde_json::to_string(&resource.spec)?;
    resource.set_annotation(&keys.backup_state, state);
    Ok(())
}

/// A merge patch document that saves the current `spec` under the state key
pub(crate) fn spec_record_patch(
    resource: &ManagedResource,
    keys: &AnnotationKeys,
) -> Result<Value, AdapterError> {
    let state = serde_json::to_string(&resource.spec)?;
    let mut annotations = Map::new();
    annotations.insert(keys.backup_state.clone(), Value::String(state));
    let mut metadata = Map::new();
    metadata.insert("annotations".to_string(), Value::Object(annotations));
    let mut doc = Map::new();
    doc.insert("metadata".to_string(), Value::Object(metadata));
    Ok(Value::Object(doc))
}

/// Put back the `spec` saved under the state key, if any.
///
/// Returns whether a saved spec was found.
pub(crate) fn restore_spec(
    resource: &mut ManagedResource,
    keys: &AnnotationKeys,
) -> Result<bool, AdapterError> {
    let Some(raw) = resource.annotation(&keys.backup_state) else {
        return Ok(false);
    };
    let spec: Value = serde_json::from_str(raw)
        .map_err(|e| corrupt(resource, &keys.backup_state, e))?;
    if !spec.is_object() {
        return Err(corrupt(resource, &keys.backup_state, "saved spec is not an object"));
    }
    resource.spec = spec;
    Ok(true)
}

/// Remove every backup annotation
pub(crate) fn clear(resource: &mut ManagedResource, keys: &AnnotationKeys) {
    for key in keys.backup_keys() {
        resource.remove_annotation(key);
    }
}

pub(crate) fn corrupt(resource: &ManagedResource, key: &str, reason: impl Display) -> AdapterError {
    AdapterError::BackupCorrupt {
        resource: resource.id(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Drop an unreadable backup record, leaving the live values alone.
///
/// The resource is persisted without the record so the next tick has
/// nothing left to do, and `error` is handed back so the failure is seen.
pub(crate) async fn discard_corrupt<S: ResourceStore>(
    resource: &mut ManagedResource,
    keys: &AnnotationKeys,
    store: &S,
    error: AdapterError,
) -> Result<(), AdapterError> {
    tracing::warn!(resource = %resource.id(), error = %error, "discarding corrupt backup record");
    clear(resource, keys);
    *resource = store.update(resource).await?;
    Err(error)
}
