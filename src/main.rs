// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cm_to_service::config::Config;
use cm_to_service::feed::ChangeFeed;
use cm_to_service::kubernetes::{connect, KubeServiceStore};
use cm_to_service::reconcilers::ServiceReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting cm-to-service controller");

    let config = Arc::new(Config::from_env().context("Failed to load configuration")?);
    info!(
        "Configuration loaded: label_to_watch={}, namespace={}, rds_instance_label={}, created_label_value={}, resync_interval={:?}",
        config.label_to_watch,
        config.namespace_scope(),
        config.rds_instance_label,
        config.created_label_value,
        config.resync_interval
    );

    let client = connect().await.context("Failed to create Kubernetes client")?;

    let feed = ChangeFeed::new(client.clone(), &config);
    let reconciler = ServiceReconciler::new(KubeServiceStore::new(client), config.clone());

    let cancel = CancellationToken::new();
    let mut controller = tokio::spawn(reconciler.run(feed.subscribe(), cancel.clone()));

    tokio::select! {
        res = &mut controller => {
            warn!("Reconciler stopped unexpectedly");
            res??;
        }
        _ = shutdown_signal() => {
            cancel.cancel();
            controller.await??;
        }
    }

    info!("cm-to-service controller stopped");
    Ok(())
}

/// Initialize tracing, honoring RUST_LOG
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kube=warn,hyper=warn"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received CTRL+C signal"),
        _ = terminate => info!("Received SIGTERM signal"),
    }
}
