// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-memory watch cache turning raw watcher events into Added/Updated/Removed.

use crate::types::{ConfigMapEvent, ObjectKey};
use k8s_openapi::api::core::v1::ConfigMap;
use kube_runtime::watcher;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Last seen state of every watched ConfigMap.
///
/// The watcher only reports "this object now looks like X" and periodic
/// relists; the cache remembers what was delivered before so the feed can
/// tell a creation from an update, and can notice objects that vanished
/// while the watch was down.
#[derive(Debug)]
pub struct WatchCache {
    label: String,
    objects: BTreeMap<ObjectKey, ConfigMap>,
    /// Keys seen during an in-progress relist
    relist: Option<BTreeSet<ObjectKey>>,
}

impl WatchCache {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            objects: BTreeMap::new(),
            relist: None,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether a ConfigMap carries the watched label (any value)
    pub fn selects(&self, cm: &ConfigMap) -> bool {
        cm.metadata
            .labels
            .as_ref()
            .is_some_and(|l| l.contains_key(&self.label))
    }

    /// Fold one watcher event into the cache, returning the events to deliver
    pub fn apply(&mut self, event: watcher::Event<ConfigMap>) -> Vec<ConfigMapEvent> {
        match event {
            watcher::Event::Apply(cm) => self.upsert(cm).into_iter().collect(),
            watcher::Event::Delete(cm) => self.remove(cm).into_iter().collect(),
            watcher::Event::Init => {
                debug!(cached = self.objects.len(), "Relist started");
                self.relist = Some(BTreeSet::new());
                Vec::new()
            }
            watcher::Event::InitApply(cm) => {
                if let Some(seen) = self.relist.as_mut() {
                    seen.insert(ObjectKey::of(&cm));
                }
                self.upsert(cm).into_iter().collect()
            }
            watcher::Event::InitDone => self.finish_relist(),
        }
    }

    /// Re-deliver every cached object as an update of itself
    pub fn resync(&self) -> Vec<ConfigMapEvent> {
        self.objects
            .values()
            .map(|cm| ConfigMapEvent::Updated {
                old: cm.clone(),
                new: cm.clone(),
            })
            .collect()
    }

    fn upsert(&mut self, cm: ConfigMap) -> Option<ConfigMapEvent> {
        let key = ObjectKey::of(&cm);

        // Lost the label: it left the selector
        if !self.selects(&cm) {
            return self.objects.remove(&key).map(ConfigMapEvent::Removed);
        }

        match self.objects.insert(key, cm.clone()) {
            Some(old) => Some(ConfigMapEvent::Updated { old, new: cm }),
            None => Some(ConfigMapEvent::Added(cm)),
        }
    }

    fn remove(&mut self, cm: ConfigMap) -> Option<ConfigMapEvent> {
        let cached = self.objects.remove(&ObjectKey::of(&cm));
        if self.selects(&cm) {
            Some(ConfigMapEvent::Removed(cm))
        } else {
            cached.map(ConfigMapEvent::Removed)
        }
    }

    fn finish_relist(&mut self) -> Vec<ConfigMapEvent> {
        let Some(seen) = self.relist.take() else {
            return Vec::new();
        };

        let stale: Vec<ObjectKey> = self
            .objects
            .keys()
            .filter(|k| !seen.contains(*k))
            .cloned()
            .collect();

        debug!(
            listed = seen.len(),
            stale = stale.len(),
            "Relist complete"
        );

        stale
            .into_iter()
            .filter_map(|k| self.objects.remove(&k))
            .map(ConfigMapEvent::Removed)
            .collect()
    }
}
