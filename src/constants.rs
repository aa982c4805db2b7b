// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes label keys used by the controller
pub mod labels {
    /// Label on a ConfigMap naming the RDS instance whose host/port it carries
    pub const RDS_INSTANCE: &str = "fiware.rds-instance";
    /// Provenance label stamped on every Service this controller creates
    pub const CREATED_BY: &str = "fiware.created-by";
    /// Default value of the provenance label
    pub const CREATED_BY_DEFAULT_VALUE: &str = "k8s-cm-to-service";
}

/// ConfigMap data keys are `<PREFIX><endpoint id><SUFFIX>`
pub mod data_keys {
    pub const PREFIX: &str = ".";
    pub const HOST_SUFFIX: &str = "-host";
    pub const PORT_SUFFIX: &str = "-port";
}

/// Environment variables read at startup
pub mod env {
    pub const LABEL_TO_WATCH: &str = "LABEL_TO_WATCH";
    pub const NAMESPACE_TO_WATCH: &str = "NAMESPACE_TO_WATCH";
    pub const CREATED_LABEL_VALUE: &str = "CREATED_LABEL_VALUE";
    pub const RDS_INSTANCE_LABEL: &str = "RDS_INSTANCE_LABEL";
    pub const RESYNC_INTERVAL_SECS: &str = "RESYNC_INTERVAL_SECS";
}

/// Full resync period used when `RESYNC_INTERVAL_SECS` is not set
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 600;
