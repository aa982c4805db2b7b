// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use k8s_openapi::api::core::v1::ConfigMap;
use kube::ResourceExt;
use std::fmt;

/// Identity of a namespaced object
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn of(cm: &ConfigMap) -> Self {
        Self {
            namespace: cm.namespace().unwrap_or_default(),
            name: cm.name_any(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A lifecycle change of a watched ConfigMap, as delivered by the change feed
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigMapEvent {
    /// First observation of the ConfigMap
    Added(ConfigMap),
    /// The ConfigMap changed (or was re-delivered by a resync)
    Updated { old: ConfigMap, new: ConfigMap },
    /// The ConfigMap is gone, carrying its last known state
    Removed(ConfigMap),
}

impl ConfigMapEvent {
    /// The ConfigMap state the event should be reconciled against
    pub fn object(&self) -> &ConfigMap {
        match self {
            ConfigMapEvent::Added(cm) => cm,
            ConfigMapEvent::Updated { new, .. } => new,
            ConfigMapEvent::Removed(cm) => cm,
        }
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::of(self.object())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConfigMapEvent::Added(_) => "added",
            ConfigMapEvent::Updated { .. } => "updated",
            ConfigMapEvent::Removed(_) => "removed",
        }
    }
}
