// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The snooze window control object
//!
//! A window names a set of resources (namespace, label selector, kinds), a
//! schedule, and what "snoozed" means for them.

use crate::resource::{LabelSelector, ManagedResource};
use crate::schedule::ScheduleSpec;
use crate::status::SnoozeWindowStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind name carried by window manifests
pub const WINDOW_KIND: &str = "SnoozeWindow";

/// Identity of a snooze window
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowRef {
    pub namespace: String,
    pub name: String,
}

impl WindowRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub resource_version: u64,
}

/// JSON patch flavours accepted by the patch action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchKind {
    #[default]
    Strategic,
    Merge,
    Json,
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchKind::Strategic => write!(f, "strategic"),
            PatchKind::Merge => write!(f, "merge"),
            PatchKind::Json => write!(f, "json"),
        }
    }
}

/// What snoozing does to a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnoozeAction {
    /// Scale replicas to zero
    #[default]
    ScaleToZero,
    /// Set `spec.suspend`
    Suspend,
    /// Delete the resource outright; not restorable
    Delete,
    /// Apply a custom patch, restoring the saved spec on wake
    #[serde(rename_all = "camelCase")]
    Patch { patch_type: PatchKind, data: Value },
}

impl SnoozeAction {
    pub fn name(&self) -> &'static str {
        match self {
            SnoozeAction::ScaleToZero => "scaleToZero",
            SnoozeAction::Suspend => "suspend",
            SnoozeAction::Delete => "delete",
            SnoozeAction::Patch { .. } => "patch",
        }
    }
}

/// A kind of resource to manage, with an optional per-kind action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKindSpec {
    pub api_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<SnoozeAction>,
}

impl ResourceKindSpec {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: SnoozeAction) -> Self {
        self.action = Some(action);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupConfig {
    /// Also store the full serialized `spec` of every snoozed resource
    #[serde(default)]
    pub full_state: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozeWindowSpec {
    /// Namespace to manage; the window's own namespace when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub label_selector: LabelSelector,
    pub schedule: ScheduleSpec,
    #[serde(default)]
    pub resource_kinds: Vec<ResourceKindSpec>,
    #[serde(default)]
    pub action: SnoozeAction,
    #[serde(default)]
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozeWindow {
    pub metadata: WindowMeta,
    pub spec: SnoozeWindowSpec,
    #[serde(default)]
    pub status: SnoozeWindowStatus,
}

impl SnoozeWindow {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, spec: SnoozeWindowSpec) -> Self {
        Self {
            metadata: WindowMeta {
                name: name.into(),
                namespace: namespace.into(),
                resource_version: 0,
            },
            spec,
            status: SnoozeWindowStatus::default(),
        }
    }

    pub fn id(&self) -> WindowRef {
        WindowRef::new(&self.metadata.namespace, &self.metadata.name)
    }

    /// Namespace whose resources this window governs
    pub fn target_namespace(&self) -> &str {
        match self.spec.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => ns,
            _ => &self.metadata.namespace,
        }
    }

    /// The kind's own action if it has one, else the window-wide action
    pub fn action_for<'a>(&'a self, kind: &'a ResourceKindSpec) -> &'a SnoozeAction {
        kind.action.as_ref().unwrap_or(&self.spec.action)
    }
}

/// A document imported from the manifests directory
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    Window(Box<SnoozeWindow>),
    Resource(Box<ManagedResource>),
}

impl Manifest {
    /// Documents with `kind: SnoozeWindow` are windows; anything else is a
    /// managed resource.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.get("kind").and_then(Value::as_str) == Some(WINDOW_KIND) {
            Ok(Manifest::Window(Box::new(serde_json::from_value(value)?)))
        } else {
            Ok(Manifest::Resource(Box::new(serde_json::from_value(value)?)))
        }
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
