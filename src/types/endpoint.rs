// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::data_keys::{HOST_SUFFIX, PORT_SUFFIX, PREFIX};
use k8s_openapi::api::core::v1::ConfigMap;

/// Remote RDS endpoint described by a ConfigMap.
///
/// `host` and `port` are empty when the matching data key is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdsEndpoint {
    pub id: String,
    pub host: String,
    pub port: String,
}

impl RdsEndpoint {
    /// Read the endpoint named by `instance_label` out of a ConfigMap.
    ///
    /// Returns `None` when the ConfigMap has no (or an empty) instance label.
    pub fn from_config_map(cm: &ConfigMap, instance_label: &str) -> Option<Self> {
        let id = cm
            .metadata
            .labels
            .as_ref()
            .and_then(|l| l.get(instance_label))
            .filter(|v| !v.is_empty())?;

        let value = |key: String| {
            cm.data
                .as_ref()
                .and_then(|d| d.get(&key))
                .cloned()
                .unwrap_or_default()
        };

        Some(Self {
            host: value(host_key(id)),
            port: value(port_key(id)),
            id: id.clone(),
        })
    }
}

/// Data key holding the host of endpoint `id`
pub fn host_key(id: &str) -> String {
    format!("{PREFIX}{id}{HOST_SUFFIX}")
}

/// Data key holding the port of endpoint `id`
pub fn port_key(id: &str) -> String {
    format!("{PREFIX}{id}{PORT_SUFFIX}")
}
