// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Managed resources as seen by the engine
//!
//! A resource is an opaque cluster object: identity, metadata, and a JSON
//! `spec`. The engine only ever touches `spec.replicas`, `spec.suspend`,
//! annotations, or the whole `spec` when restoring a full-state backup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a managed resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ResourceRef {
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// Object metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Optimistic-concurrency version, bumped by the store on every write
    #[serde(default)]
    pub resource_version: u64,
}

/// A cluster object selected for snoozing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedResource {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: Value,
}

impl ManagedResource {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
                ..ObjectMeta::default()
            },
            spec: Value::Object(Map::new()),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_spec(mut self, spec: Value) -> Self {
        self.spec = spec;
        self
    }

    pub fn id(&self) -> ResourceRef {
        ResourceRef::new(&self.kind, &self.metadata.namespace, &self.metadata.name)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    pub fn has_annotation(&self, key: &str) -> bool {
        self.metadata.annotations.contains_key(key)
    }

    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.annotations.insert(key.into(), value.into());
    }

    pub fn remove_annotation(&mut self, key: &str) -> Option<String> {
        self.metadata.annotations.remove(key)
    }

    /// `spec.replicas`, if present and integral
    pub fn replicas(&self) -> Option<i64> {
        self.spec.get("replicas").and_then(Value::as_i64)
    }

    pub fn set_replicas(&mut self, replicas: i64) {
        self.set_spec_field("replicas", Value::from(replicas));
    }

    /// `spec.suspend`, if present and boolean
    pub fn suspend(&self) -> Option<bool> {
        self.spec.get("suspend").and_then(Value::as_bool)
    }

    pub fn set_suspend(&mut self, suspend: bool) {
        self.set_spec_field("suspend", Value::Bool(suspend));
    }

    fn set_spec_field(&mut self, field: &str, value: Value) {
        if let Some(spec) = self.spec.as_object_mut() {
            spec.insert(field.to_string(), value);
            return;
        }
        let mut spec = Map::new();
        spec.insert(field.to_string(), value);
        self.spec = Value::Object(spec);
    }

    /// Apply an RFC 7386 merge patch to the whole object.
    ///
    /// Identity (`apiVersion`, `kind`, name, namespace) and the resource
    /// version cannot be changed by a patch.
    pub fn apply_merge_patch(&self, patch: &Value) -> Result<Self, serde_json::Error> {
        let mut doc = serde_json::to_value(self)?;
        merge_patch(&mut doc, patch);
        let mut patched: ManagedResource = serde_json::from_value(doc)?;
        patched.api_version.clone_from(&self.api_version);
        patched.kind.clone_from(&self.kind);
        patched.metadata.name.clone_from(&self.metadata.name);
        patched.metadata.namespace.clone_from(&self.metadata.namespace);
        patched.metadata.resource_version = self.metadata.resource_version;
        Ok(patched)
    }
}

/// RFC 7386 JSON merge patch
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Some(target_map) = target.as_object_mut() else {
        return;
    };
    for (key, value) in patch_map {
        if value.is_null() {
            target_map.remove(key);
        } else {
            merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
        }
    }
}

/// Equality-based label selector; every pair must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSelector(pub BTreeMap<String, String>);

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// An empty selector matches everything
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.0
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|actual| actual == v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", pairs.join(","))
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
