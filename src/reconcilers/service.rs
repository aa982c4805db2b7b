// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service reconciler - turns ConfigMap events into ExternalName Services.

use crate::config::Config;
use crate::constants::labels;
use crate::kubernetes::ServiceStore;
use crate::types::{ConfigMapEvent, ObjectKey, RdsEndpoint};
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::{ConfigMap, Service, ServiceSpec};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use std::pin::pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// What handling a single event amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    /// The Service is gone (deleted now, or was already absent)
    Deleted,
    /// The ConfigMap was incomplete; no store call was made
    Skipped,
    Failed,
}

pub struct ServiceReconciler<S> {
    store: S,
    config: Arc<Config>,
}

impl<S: ServiceStore> ServiceReconciler<S> {
    pub fn new(store: S, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle events one at a time until the feed ends or `cancel` fires.
    ///
    /// Cancellation is checked between events; an in-flight store call completes first.
    pub async fn run<E>(self, events: E, cancel: CancellationToken) -> anyhow::Result<()>
    where
        E: Stream<Item = ConfigMapEvent>,
    {
        let mut events = pin!(events);

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Cancellation requested, stopping reconciler");
                    break;
                }
                next = events.next() => match next {
                    Some(event) => event,
                    None => {
                        warn!("Change feed ended");
                        break;
                    }
                },
            };

            let outcome = self.handle(&event).await;
            debug!("Handled {} event for {}: {:?}", event.kind(), event.key(), outcome);
        }

        Ok(())
    }

    /// Translate one event into at most one logical store call.
    ///
    /// Never fails: problems are logged and the event counts as handled.
    #[instrument(skip(self, event), fields(event = event.kind(), configmap = %event.key()))]
    pub async fn handle(&self, event: &ConfigMapEvent) -> Outcome {
        match event {
            ConfigMapEvent::Added(cm) => self.apply(cm, true).await,
            ConfigMapEvent::Updated { new, .. } => self.apply(new, false).await,
            ConfigMapEvent::Removed(cm) => self.remove(cm).await,
        }
    }

    /// Value of the watched label, which names the Service
    fn service_name<'a>(&self, cm: &'a ConfigMap) -> Option<&'a str> {
        cm.metadata
            .labels
            .as_ref()
            .and_then(|l| l.get(&self.config.label_to_watch))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    async fn apply(&self, cm: &ConfigMap, create: bool) -> Outcome {
        let key = ObjectKey::of(cm);

        let Some(service_name) = self.service_name(cm) else {
            error!(
                "ConfigMap {} does not provide a service name in label {}",
                key, self.config.label_to_watch
            );
            return Outcome::Skipped;
        };

        let Some(endpoint) = RdsEndpoint::from_config_map(cm, &self.config.rds_instance_label)
        else {
            error!(
                "ConfigMap {} does not provide the rds instance name in label {}",
                key, self.config.rds_instance_label
            );
            return Outcome::Skipped;
        };

        // Incomplete endpoint data is reported but still written through
        if endpoint.host.is_empty() {
            error!("ConfigMap {} does not provide the rds host for {}", key, endpoint.id);
        }
        if endpoint.port.is_empty() {
            error!("ConfigMap {} does not provide the rds port for {}", key, endpoint.id);
        }

        let service = build_service(&self.config, service_name, &key.namespace, &endpoint.host);

        if create {
            self.create(&service, service_name).await
        } else {
            self.replace(&service, service_name).await
        }
    }

    async fn create(&self, service: &Service, name: &str) -> Outcome {
        match self.store.create(service).await {
            Ok(_) => {
                info!("Created service {}", name);
                Outcome::Created
            }
            // Left untouched: it may belong to someone else
            Err(e) if e.is_already_exists() => {
                error!("Service {} already exists, not taking it over: {}", name, e);
                Outcome::Failed
            }
            Err(e) => {
                error!("Was not able to create service {}: {}", name, e);
                Outcome::Failed
            }
        }
    }

    async fn replace(&self, service: &Service, name: &str) -> Outcome {
        match self.store.replace(service).await {
            Ok(_) => {
                info!("Updated service {}", name);
                Outcome::Updated
            }
            Err(e) if e.is_not_found() => {
                debug!("Service {} does not exist yet, creating it", name);
                match self.store.create(service).await {
                    Ok(_) => {
                        info!("Created service {}", name);
                        Outcome::Created
                    }
                    Err(e) => {
                        error!("Was not able to create missing service {}: {}", name, e);
                        Outcome::Failed
                    }
                }
            }
            Err(e) => {
                error!("Was not able to update service {}: {}", name, e);
                Outcome::Failed
            }
        }
    }

    async fn remove(&self, cm: &ConfigMap) -> Outcome {
        let key = ObjectKey::of(cm);

        let Some(service_name) = self.service_name(cm) else {
            error!(
                "ConfigMap {} does not provide a service name in label {}",
                key, self.config.label_to_watch
            );
            return Outcome::Skipped;
        };

        match self.store.delete(&key.namespace, service_name).await {
            Ok(()) => {
                info!("Service {} was deleted", service_name);
                Outcome::Deleted
            }
            Err(e) if e.is_not_found() => {
                info!("Service {} was already gone", service_name);
                Outcome::Deleted
            }
            Err(e) => {
                error!("Service {} was not deleted: {}", service_name, e);
                Outcome::Failed
            }
        }
    }
}

/// Desired ExternalName Service for a ConfigMap.
///
/// The port is not part of it: an ExternalName Service only aliases a host.
pub fn build_service(config: &Config, name: &str, namespace: &str, host: &str) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(BTreeMap::from([(
                labels::CREATED_BY.to_string(),
                config.created_label_value.clone(),
            )])),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("ExternalName".to_string()),
            external_name: Some(host.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}
