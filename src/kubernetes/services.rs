// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service store: the create/replace/delete contract the reconciler writes through

use crate::error::Result;
use k8s_openapi::api::core::v1::Service;
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client, ResourceExt,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Where derived Services are written.
///
/// Calls are unconditional: no read-before-write and no resource version
/// preconditions, so conflicts are arbitrated by the store itself.
pub trait ServiceStore: Send + Sync {
    /// Create a Service in its own namespace
    fn create(&self, service: &Service) -> impl Future<Output = Result<Service>> + Send;

    /// Fully replace an existing Service
    fn replace(&self, service: &Service) -> impl Future<Output = Result<Service>> + Send;

    /// Delete a Service by namespace and name
    fn delete(&self, namespace: &str, name: &str) -> impl Future<Output = Result<()>> + Send;
}

impl<T: ServiceStore> ServiceStore for Arc<T> {
    fn create(&self, service: &Service) -> impl Future<Output = Result<Service>> + Send {
        (**self).create(service)
    }

    fn replace(&self, service: &Service) -> impl Future<Output = Result<Service>> + Send {
        (**self).replace(service)
    }

    fn delete(&self, namespace: &str, name: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).delete(namespace, name)
    }
}

/// [`ServiceStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeServiceStore {
    client: Client,
}

impl KubeServiceStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Service> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

impl ServiceStore for KubeServiceStore {
    #[instrument(skip(self, service), fields(service = %format!("{}/{}", service.namespace().unwrap_or_default(), service.name_any())))]
    async fn create(&self, service: &Service) -> Result<Service> {
        let namespace = service.namespace().unwrap_or_default();
        let created = self
            .api(&namespace)
            .create(&PostParams::default(), service)
            .await?;
        debug!("Service created");
        Ok(created)
    }

    #[instrument(skip(self, service), fields(service = %format!("{}/{}", service.namespace().unwrap_or_default(), service.name_any())))]
    async fn replace(&self, service: &Service) -> Result<Service> {
        let namespace = service.namespace().unwrap_or_default();
        let replaced = self
            .api(&namespace)
            .replace(&service.name_any(), &PostParams::default(), service)
            .await?;
        debug!("Service replaced");
        Ok(replaced)
    }

    #[instrument(skip(self))]
    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await?;
        debug!("Service deleted");
        Ok(())
    }
}
