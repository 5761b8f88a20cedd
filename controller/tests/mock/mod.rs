/*!

This test module provides mock implementations of the [`LiveState`] and [`TokenSource`] traits so
that reconciliation can be tested without Kubernetes.

[`MockLiveState`] keeps objects as JSON and imitates the parts of the k8s API server that the
reconcilers depend on: uids and resource versions, conflicts, service addresses, and fields that
k8s defaults when they are left unset.

!*/

use async_trait::async_trait;
use controlplane_controller::{KubeResult, LiveState, ManagedObject, TokenError, TokenSource};
use controlplane_controller::{ControllerEndpoint, Logger};
use kube::error::ErrorResponse;
use log::{Log, Metadata, Record};
use model::{
    ControlPlane, ControlPlaneSpec, ControllerSettings, Database, IofogUser, KubeletSettings,
    PortManagerSettings, SkupperSettings,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const NAMESPACE: &str = "edge";
pub const NAME: &str = "cp";
pub const PASSWORD: &str = "s3cret";

/// A `ControlPlane` exposing its controller through a load balancer.
pub fn control_plane() -> ControlPlane {
    let mut control_plane = ControlPlane::new(
        NAME,
        ControlPlaneSpec {
            controller: ControllerSettings {
                replicas: 3,
                image: "coord:v1".to_string(),
                image_pull_secret: None,
                service_type: "LoadBalancer".to_string(),
                load_balancer_ip: String::new(),
                database: Database {
                    provider: "postgres".to_string(),
                    database_name: "ctrl".to_string(),
                    user: "u".to_string(),
                    password: "p".to_string(),
                    host: "db".to_string(),
                    port: 5432,
                },
                user: IofogUser {
                    email: "user@example.com".to_string(),
                    password: base64::encode(PASSWORD),
                },
            },
            kubelet: KubeletSettings {
                image: "kubelet:v1".to_string(),
            },
            port_manager: PortManagerSettings {
                watch_namespace: NAMESPACE.to_string(),
                image: "port-manager:v1".to_string(),
            },
            skupper: SkupperSettings {
                image: "skupper:v1".to_string(),
                volume_mount_path: "/etc/qpid-dispatch-certs".to_string(),
            },
        },
    );
    control_plane.metadata.namespace = Some(NAMESPACE.to_string());
    control_plane
}

/// A call that changed the live state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mutation {
    pub operation: &'static str,
    pub kind: String,
    pub name: String,
}

impl Mutation {
    pub fn new(operation: &'static str, kind: &str, name: &str) -> Self {
        Self {
            operation,
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}

type Key = (String, String, String);

#[derive(Default)]
struct State {
    objects: BTreeMap<Key, Value>,
    mutations: Vec<Mutation>,
    failures: Vec<(&'static str, String)>,
    services_created: usize,
    resource_version: u64,
}

/// An in-memory k8s API.
pub struct MockLiveState {
    state: Mutex<State>,
    assign_ingress: bool,
}

impl Default for MockLiveState {
    fn default() -> Self {
        Self {
            state: Mutex::default(),
            assign_ingress: true,
        }
    }
}

impl MockLiveState {
    /// A live state holding `control_plane` and the secrets mounted by skupper.
    pub fn with_control_plane(control_plane: &ControlPlane) -> Self {
        let live = Self::default();
        live.seed_control_plane(control_plane);
        live
    }

    /// Load balancers are never given an ingress, as though no cloud provider was present.
    pub fn without_ingress(mut self) -> Self {
        self.assign_ingress = false;
        self
    }

    pub fn seed_control_plane(&self, control_plane: &ControlPlane) {
        self.seed(NAMESPACE, control_plane);
        for secret in ["skupper-internal", "skupper-amqps"] {
            self.seed_value(
                NAMESPACE,
                json!({
                    "apiVersion": "v1",
                    "kind": "Secret",
                    "metadata": { "name": secret },
                    "data": { "tls.crt": "Y2VydA==" }
                }),
            );
        }
    }

    /// Store `object` without recording a mutation, as though it was created out-of-band.
    pub fn seed<K: Serialize>(&self, namespace: &str, object: &K) {
        self.seed_value(namespace, serde_json::to_value(object).unwrap());
    }

    pub fn seed_value(&self, namespace: &str, mut value: Value) {
        let mut state = self.state.lock().unwrap();
        let key = key_of(namespace, &value);
        self.admit(&mut state, &mut value);
        state.objects.insert(key, value);
    }

    /// Remove an object without recording a mutation.
    pub fn remove(&self, kind: &str, namespace: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .objects
            .remove(&(kind.to_string(), namespace.to_string(), name.to_string()));
    }

    /// Change a stored object without recording a mutation.
    pub fn modify<F>(&self, kind: &str, namespace: &str, name: &str, f: F)
    where
        F: FnOnce(&mut Value),
    {
        let mut state = self.state.lock().unwrap();
        let key = (kind.to_string(), namespace.to_string(), name.to_string());
        let value = state.objects.get_mut(&key).unwrap();
        f(value);
        let version = value["metadata"]["resourceVersion"]
            .as_str()
            .unwrap()
            .parse::<u64>()
            .unwrap();
        value["metadata"]["resourceVersion"] = json!((version + 1000).to_string());
    }

    pub fn object(&self, kind: &str, namespace: &str, name: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(kind.to_string(), namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn names(&self, kind: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .keys()
            .filter(|(k, _, _)| k == kind)
            .map(|(_, _, name)| name.clone())
            .collect()
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub fn clear_mutations(&self) {
        self.state.lock().unwrap().mutations.clear();
    }

    /// Every later `operation` on objects of `kind` fails with an internal server error.
    pub fn fail_on(&self, operation: &'static str, kind: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((operation, kind.to_string()));
    }

    fn check_failure(state: &State, operation: &'static str, kind: &str) -> KubeResult<()> {
        if state
            .failures
            .iter()
            .any(|(op, k)| *op == operation && k == kind)
        {
            return Err(api_error(500, "InternalError", "injected failure"));
        }
        Ok(())
    }

    /// Assign the fields that the API server fills in when an object is created.
    fn admit(&self, state: &mut State, value: &mut Value) {
        state.resource_version += 1;
        let name = value["metadata"]["name"].as_str().unwrap_or_default().to_string();
        if value["metadata"]["uid"].is_null() {
            value["metadata"]["uid"] = json!(format!("uid-{}", name));
        }
        value["metadata"]["resourceVersion"] = json!(state.resource_version.to_string());

        match value["kind"].as_str().unwrap_or_default() {
            "Deployment" => apply_deployment_defaults(value),
            "Service" => {
                state.services_created += 1;
                let n = state.services_created;
                let spec = &mut value["spec"];
                if spec["clusterIP"].is_null() {
                    spec["clusterIP"] = json!(format!("10.96.0.{}", n));
                    spec["clusterIPs"] = json!([format!("10.96.0.{}", n)]);
                }
                if spec["sessionAffinity"].is_null() {
                    spec["sessionAffinity"] = json!("None");
                }
                if spec["type"].is_null() {
                    spec["type"] = json!("ClusterIP");
                }
                if spec["type"] == json!("LoadBalancer") && self.assign_ingress {
                    value["status"] = json!({
                        "loadBalancer": { "ingress": [{ "ip": format!("203.0.113.{}", n) }] }
                    });
                }
            }
            "ServiceAccount" => {
                value["secrets"] = json!([{ "name": format!("{}-token-x7k2p", name) }]);
            }
            _ => {}
        }
    }
}

fn apply_deployment_defaults(value: &mut Value) {
    let spec = &mut value["spec"];
    if spec["revisionHistoryLimit"].is_null() {
        spec["revisionHistoryLimit"] = json!(10);
    }
    if spec["progressDeadlineSeconds"].is_null() {
        spec["progressDeadlineSeconds"] = json!(600);
    }
    let pod = &mut spec["template"]["spec"];
    if pod["restartPolicy"].is_null() {
        pod["restartPolicy"] = json!("Always");
    }
    if pod["dnsPolicy"].is_null() {
        pod["dnsPolicy"] = json!("ClusterFirst");
    }
    if let Some(containers) = pod["containers"].as_array_mut() {
        for container in containers {
            if container["terminationMessagePath"].is_null() {
                container["terminationMessagePath"] = json!("/dev/termination-log");
            }
            // The API server does not store empty env values.
            if let Some(env) = container["env"].as_array_mut() {
                for var in env {
                    if var["value"] == json!("") {
                        if let Some(var) = var.as_object_mut() {
                            var.remove("value");
                        }
                    }
                }
            }
        }
    }
}

fn key_of(namespace: &str, value: &Value) -> Key {
    (
        value["kind"].as_str().unwrap().to_string(),
        namespace.to_string(),
        value["metadata"]["name"].as_str().unwrap().to_string(),
    )
}

fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    })
}

fn from_value<K: ManagedObject>(value: Value) -> KubeResult<K> {
    serde_json::from_value(value).map_err(kube::Error::SerdeError)
}

fn to_value<K: ManagedObject>(object: &K) -> KubeResult<Value> {
    serde_json::to_value(object).map_err(kube::Error::SerdeError)
}

#[async_trait]
impl LiveState for MockLiveState {
    async fn get<K>(&self, namespace: &str, name: &str) -> KubeResult<Option<K>>
    where
        K: ManagedObject,
    {
        let kind = K::kind(&()).to_string();
        let state = self.state.lock().unwrap();
        Self::check_failure(&state, "get", &kind)?;
        state
            .objects
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned()
            .map(from_value)
            .transpose()
    }

    async fn create<K>(&self, namespace: &str, object: &K) -> KubeResult<K>
    where
        K: ManagedObject,
    {
        let kind = K::kind(&()).to_string();
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state, "create", &kind)?;
        let mut value = to_value(object)?;
        let key = key_of(namespace, &value);
        if state.objects.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists", "object already exists"));
        }
        self.admit(&mut state, &mut value);
        state.objects.insert(key.clone(), value.clone());
        state.mutations.push(Mutation::new("create", &kind, &key.2));
        from_value(value)
    }

    async fn replace<K>(&self, namespace: &str, name: &str, object: &K) -> KubeResult<K>
    where
        K: ManagedObject,
    {
        let kind = K::kind(&()).to_string();
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state, "update", &kind)?;
        let key = (kind.clone(), namespace.to_string(), name.to_string());
        let current = match state.objects.get(&key) {
            Some(current) => current.clone(),
            None => return Err(api_error(404, "NotFound", "object not found")),
        };
        let mut value = to_value(object)?;
        if value["metadata"]["resourceVersion"] != current["metadata"]["resourceVersion"] {
            return Err(api_error(409, "Conflict", "the object has been modified"));
        }

        state.resource_version += 1;
        value["metadata"]["uid"] = current["metadata"]["uid"].clone();
        value["metadata"]["resourceVersion"] = json!(state.resource_version.to_string());
        if !current["status"].is_null() {
            value["status"] = current["status"].clone();
        }
        if kind == "Deployment" {
            apply_deployment_defaults(&mut value);
        }
        state.objects.insert(key, value.clone());
        state.mutations.push(Mutation::new("update", &kind, name));
        from_value(value)
    }
}

/// Mints predictable tokens and counts how often it was asked to.
#[derive(Default)]
pub struct MockTokenSource {
    minted: AtomicUsize,
}

impl MockTokenSource {
    pub fn minted(&self) -> usize {
        self.minted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for MockTokenSource {
    async fn mint(&self, _endpoint: &ControllerEndpoint) -> Result<String, TokenError> {
        let n = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("minted-token-{}", n))
    }
}

/// A token source for a controller that refuses to issue tokens.
pub struct FailingTokenSource;

#[async_trait]
impl TokenSource for FailingTokenSource {
    async fn mint(&self, endpoint: &ControllerEndpoint) -> Result<String, TokenError> {
        Err(format!("controller at {} is not ready", endpoint).into())
    }
}

/// Keeps every log line written through it.
#[derive(Default)]
pub struct CapturingLog {
    lines: Mutex<Vec<String>>,
}

impl CapturingLog {
    /// A capturing log and a [`Logger`] that writes to it.
    pub fn install() -> (&'static CapturingLog, Logger) {
        let log: &'static CapturingLog = Box::leak(Box::default());
        (log, Logger::new(log))
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Log for CapturingLog {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{} {}", record.level(), record.args()));
    }

    fn flush(&self) {}
}
