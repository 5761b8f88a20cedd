/*!

Access to the live objects in the cluster. Reconcilers only talk to k8s through the [`LiveState`]
trait so that they can be tested without Kubernetes.

!*/

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Secret, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use k8s_openapi::NamespaceResourceScope;
use kube::api::PostParams;
use kube::{Api, Client, Resource};
use model::ControlPlane;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

pub type KubeResult<T> = std::result::Result<T, kube::Error>;

/// A namespaced k8s object kind that the operator reads or converges.
pub trait ManagedObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
    /// Copy the fields that k8s owns from the `live` object before `self` replaces it.
    fn adopt(&mut self, live: &Self) {
        self.meta_mut().resource_version = live.meta().resource_version.clone();
    }
}

impl ManagedObject for ControlPlane {}
impl ManagedObject for Deployment {}
impl ManagedObject for Role {}
impl ManagedObject for RoleBinding {}
impl ManagedObject for Secret {}

impl ManagedObject for Service {
    fn adopt(&mut self, live: &Self) {
        self.metadata.resource_version = live.metadata.resource_version.clone();
        if let (Some(desired), Some(live)) = (self.spec.as_mut(), live.spec.as_ref()) {
            desired.cluster_ip = live.cluster_ip.clone();
            desired.cluster_ips = live.cluster_ips.clone();
            desired.health_check_node_port = live.health_check_node_port;
        }
    }
}

impl ManagedObject for ServiceAccount {
    fn adopt(&mut self, live: &Self) {
        self.metadata.resource_version = live.metadata.resource_version.clone();
        // Token secrets are added by k8s.
        self.secrets = live.secrets.clone();
    }
}

/// Reads and writes live objects by name within a namespace.
#[async_trait]
pub trait LiveState: Send + Sync {
    /// Get the object named `name`, `None` if it does not exist.
    async fn get<K>(&self, namespace: &str, name: &str) -> KubeResult<Option<K>>
    where
        K: ManagedObject;

    async fn create<K>(&self, namespace: &str, object: &K) -> KubeResult<K>
    where
        K: ManagedObject;

    /// Replace the object named `name` with `object`, which must carry the live
    /// `resourceVersion`.
    async fn replace<K>(&self, namespace: &str, name: &str, object: &K) -> KubeResult<K>
    where
        K: ManagedObject;
}

/// The [`LiveState`] backed by the k8s API.
#[derive(Clone)]
pub struct KubeLiveState {
    client: Client,
}

impl KubeLiveState {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: ManagedObject,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl LiveState for KubeLiveState {
    async fn get<K>(&self, namespace: &str, name: &str) -> KubeResult<Option<K>>
    where
        K: ManagedObject,
    {
        self.api::<K>(namespace).get_opt(name).await
    }

    async fn create<K>(&self, namespace: &str, object: &K) -> KubeResult<K>
    where
        K: ManagedObject,
    {
        self.api::<K>(namespace)
            .create(&PostParams::default(), object)
            .await
    }

    async fn replace<K>(&self, namespace: &str, name: &str, object: &K) -> KubeResult<K>
    where
        K: ManagedObject,
    {
        self.api::<K>(namespace)
            .replace(name, &PostParams::default(), object)
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn namespaced<K>() -> bool
    where
        K: Resource<Scope = NamespaceResourceScope>,
    {
        true
    }

    #[test]
    fn managed_objects_are_namespaced() {
        assert!(namespaced::<ControlPlane>());
        assert!(namespaced::<Deployment>());
        assert!(namespaced::<Role>());
        assert!(namespaced::<RoleBinding>());
        assert!(namespaced::<Secret>());
        assert!(namespaced::<Service>());
        assert!(namespaced::<ServiceAccount>());
    }
}
