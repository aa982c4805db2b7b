// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env as vars, labels, DEFAULT_RESYNC_INTERVAL_SECS};
use crate::error::{ControllerError, Result};
use std::env;
use std::time::Duration;

/// Controller configuration loaded from environment variables.
///
/// Built once at startup and shared read-only by the change feed and the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Label key whose presence selects ConfigMaps and whose value names the Service
    pub label_to_watch: String,
    /// Namespace to watch, `None` for all namespaces
    pub namespace: Option<String>,
    /// Label key naming the RDS instance inside a ConfigMap
    pub rds_instance_label: String,
    /// Value of the provenance label stamped on created Services
    pub created_label_value: String,
    /// Period of the full resync, `None` disables it
    pub resync_interval: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let label_to_watch = get(vars::LABEL_TO_WATCH).ok_or_else(|| {
            ControllerError::MissingConfig(format!(
                "{} environment variable not set, no label was provided",
                vars::LABEL_TO_WATCH
            ))
        })?;

        let resync_interval = match get(vars::RESYNC_INTERVAL_SECS) {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ControllerError::InvalidConfig(format!(
                    "{}={} is not a number of seconds: {}",
                    vars::RESYNC_INTERVAL_SECS,
                    raw,
                    e
                ))
            })?,
            None => DEFAULT_RESYNC_INTERVAL_SECS,
        };

        Ok(Config {
            label_to_watch,
            namespace: get(vars::NAMESPACE_TO_WATCH),
            rds_instance_label: get(vars::RDS_INSTANCE_LABEL)
                .unwrap_or_else(|| labels::RDS_INSTANCE.to_string()),
            created_label_value: get(vars::CREATED_LABEL_VALUE)
                .unwrap_or_else(|| labels::CREATED_BY_DEFAULT_VALUE.to_string()),
            resync_interval: (resync_interval > 0).then(|| Duration::from_secs(resync_interval)),
        })
    }

    /// Human readable namespace scope for logging
    pub fn namespace_scope(&self) -> &str {
        self.namespace.as_deref().unwrap_or("<all>")
    }
}
