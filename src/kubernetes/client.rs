// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster client creation

use crate::error::{ControllerError, Result};
use kube::Client;
use tracing::{info, instrument};

/// Create a client from the in-cluster service account, or the local kubeconfig
/// when running outside a cluster
#[instrument]
pub async fn connect() -> Result<Client> {
    let client = Client::try_default()
        .await
        .map_err(|e| ControllerError::Client(format!("Failed to infer cluster config: {}", e)))?;

    info!("Connected to Kubernetes cluster");
    Ok(client)
}
