// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked Kubernetes API server, an in-memory service store
//! and object builders.

use crate::error::{ControllerError, Result};
use crate::kubernetes::ServiceStore;
use http::{Request, Response};
use k8s_openapi::api::core::v1::{ConfigMap, Service, ServiceSpec};
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::core::ErrorResponse;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service as TowerService;

#[derive(Clone)]
struct Route {
    method: String,
    path: String,
    /// Only match when the query string contains this fragment
    query: Option<String>,
    status: u16,
    body: String,
}

/// A request seen by [`MockService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    routes: Arc<Mutex<Vec<Route>>>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(Vec::new())),
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn route(self, method: &str, path: &str, query: Option<&str>, status: u16, body: &str) -> Self {
        self.routes.lock().unwrap().push(Route {
            method: method.to_string(),
            path: path.to_string(),
            query: query.map(str::to_string),
            status,
            body: body.to_string(),
        });
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.route("GET", path, None, status, body)
    }

    /// Add a response for watch requests (`GET ...?watch=true`) on the path
    pub fn on_watch(self, path: &str, body: &str) -> Self {
        self.route("GET", path, Some("watch=true"), 200, body)
    }

    /// Add a response for POST requests matching the path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.route("POST", path, None, status, body)
    }

    /// Add a response for PUT requests matching the path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.route("PUT", path, None, status, body)
    }

    /// Add a response for DELETE requests matching the path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.route("DELETE", path, None, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Method and path of every request received so far, in order
    pub fn requests(&self) -> Vec<(String, String)> {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect()
    }

    /// Every request received so far, including query strings
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }

    fn find_response(&self, method: &str, path: &str, query: &str) -> Option<(u16, String)> {
        let routes = self.routes.lock().unwrap();
        let applies = |r: &&Route| {
            r.method == method && r.query.as_deref().map_or(true, |q| query.contains(q))
        };

        // Exact path first, then prefix; query-specific routes win over generic ones
        routes
            .iter()
            .filter(applies)
            .filter(|r| r.path == path)
            .max_by_key(|r| r.query.is_some())
            .or_else(|| {
                routes
                    .iter()
                    .filter(applies)
                    .filter(|r| path.starts_with(&r.path))
                    .max_by_key(|r| r.query.is_some())
            })
            .map(|r| (r.status, r.body.clone()))
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl TowerService<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().unwrap_or_default().to_string();

        let response = self.find_response(&method, &path, &query);
        self.recorded.lock().unwrap().push(RecordedRequest {
            method,
            path: path.clone(),
            query,
        });

        Box::pin(async move {
            let (status, body) =
                response.unwrap_or_else(|| (404, not_found_json("resource", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a mock ExternalName service JSON response
pub fn service_json(name: &str, namespace: &str, external_name: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid",
            "resourceVersion": "1",
            "labels": { "fiware.created-by": "k8s-cm-to-service" }
        },
        "spec": {
            "type": "ExternalName",
            "externalName": external_name
        }
    })
    .to_string()
}

/// Create a mock ConfigMap JSON value
pub fn config_map_json(
    name: &str,
    namespace: &str,
    resource_version: &str,
    labels: &[(&str, &str)],
    data: &[(&str, &str)],
) -> serde_json::Value {
    let to_object = |pairs: &[(&str, &str)]| {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect::<serde_json::Map<_, _>>()
    };
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": resource_version,
            "labels": to_object(labels)
        },
        "data": to_object(data)
    })
}

/// Build a ConfigMap with the given labels and data
pub fn config_map(
    name: &str,
    namespace: &str,
    labels: &[(&str, &str)],
    data: &[(&str, &str)],
) -> ConfigMap {
    let to_map = |pairs: &[(&str, &str)]| {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>()
    };
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(to_map(labels)),
            ..Default::default()
        },
        data: Some(to_map(data)),
        ..Default::default()
    }
}

/// Build an ExternalName Service
pub fn external_name_service(name: &str, namespace: &str, external_name: &str) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("ExternalName".to_string()),
            external_name: Some(external_name.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn api_error(code: u16, reason: &str, message: String) -> ControllerError {
    ControllerError::Kube(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message,
        reason: reason.to_string(),
        code,
    }))
}

/// A call received by [`FakeServiceStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create { namespace: String, name: String, external_name: String },
    Replace { namespace: String, name: String, external_name: String },
    Delete { namespace: String, name: String },
}

impl StoreCall {
    fn of(service: &Service, replace: bool) -> Self {
        let namespace = service.namespace().unwrap_or_default();
        let name = service.name_any();
        let external_name = service
            .spec
            .as_ref()
            .and_then(|s| s.external_name.clone())
            .unwrap_or_default();
        if replace {
            StoreCall::Replace { namespace, name, external_name }
        } else {
            StoreCall::Create { namespace, name, external_name }
        }
    }
}

/// In-memory [`ServiceStore`] with API-server-like conflict semantics.
///
/// Create of an existing Service fails with 409, replace or delete of a
/// missing one with 404.
#[derive(Default)]
pub struct FakeServiceStore {
    services: Mutex<HashMap<(String, String), Service>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_all: Mutex<bool>,
}

impl FakeServiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a Service
    pub fn with_service(self, service: Service) -> Self {
        self.services.lock().unwrap().insert(
            (service.namespace().unwrap_or_default(), service.name_any()),
            service,
        );
        self
    }

    /// Make every call fail with a 500 until reset
    pub fn set_failing(&self, failing: bool) {
        *self.fail_all.lock().unwrap() = failing;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<Service> {
        self.services
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.services.lock().unwrap().len()
    }

    fn check_failing(&self) -> Result<()> {
        if *self.fail_all.lock().unwrap() {
            return Err(api_error(500, "InternalError", "store unavailable".to_string()));
        }
        Ok(())
    }
}

impl ServiceStore for FakeServiceStore {
    async fn create(&self, service: &Service) -> Result<Service> {
        self.calls.lock().unwrap().push(StoreCall::of(service, false));
        self.check_failing()?;

        let key = (service.namespace().unwrap_or_default(), service.name_any());
        let mut services = self.services.lock().unwrap();
        if services.contains_key(&key) {
            return Err(api_error(
                409,
                "AlreadyExists",
                format!("services \"{}\" already exists", key.1),
            ));
        }
        services.insert(key, service.clone());
        Ok(service.clone())
    }

    async fn replace(&self, service: &Service) -> Result<Service> {
        self.calls.lock().unwrap().push(StoreCall::of(service, true));
        self.check_failing()?;

        let key = (service.namespace().unwrap_or_default(), service.name_any());
        let mut services = self.services.lock().unwrap();
        if !services.contains_key(&key) {
            return Err(api_error(
                404,
                "NotFound",
                format!("services \"{}\" not found", key.1),
            ));
        }
        services.insert(key, service.clone());
        Ok(service.clone())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.calls.lock().unwrap().push(StoreCall::Delete {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        self.check_failing()?;

        match self
            .services
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()))
        {
            Some(_) => Ok(()),
            None => Err(api_error(
                404,
                "NotFound",
                format!("services \"{}\" not found", name),
            )),
        }
    }
}
