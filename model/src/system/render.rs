use crate::constants::{
    PROTOCOL_TCP, RBAC_API_GROUP, SERVICE_TYPE_LOAD_BALANCER, SERVICE_TYPE_NODE_PORT,
};
use crate::system::ComponentBundle;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    LocalObjectReference, PodSpec, PodTemplateSpec, Service, ServiceAccount, ServicePort,
    ServiceSpec,
};
use k8s_openapi::api::rbac::v1::{Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, OwnerReference};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// Where rendered objects are placed and who owns them. Owned objects are garbage collected by
/// k8s when the owner is deleted.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub namespace: String,
    pub owner: OwnerReference,
}

impl ComponentBundle {
    fn metadata(&self, placement: &Placement) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.name.clone()),
            namespace: Some(placement.namespace.clone()),
            labels: Some(self.labels.clone()),
            owner_references: Some(vec![placement.owner.clone()]),
            ..ObjectMeta::default()
        }
    }

    /// Defines the component's deployment.
    pub fn deployment(&self, placement: &Placement) -> Deployment {
        let image_pull_secrets = self.image_pull_secret.as_ref().map(|secret| {
            vec![LocalObjectReference {
                name: Some(secret.clone()),
            }]
        });

        Deployment {
            metadata: self.metadata(placement),
            spec: Some(DeploymentSpec {
                replicas: Some(self.replicas),
                selector: LabelSelector {
                    match_labels: Some(self.selector()),
                    ..LabelSelector::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(self.labels.clone()),
                        annotations: if self.annotations.is_empty() {
                            None
                        } else {
                            Some(self.annotations.clone())
                        },
                        ..ObjectMeta::default()
                    }),
                    spec: Some(PodSpec {
                        containers: self.containers.clone(),
                        volumes: if self.volumes.is_empty() {
                            None
                        } else {
                            Some(self.volumes.clone())
                        },
                        image_pull_secrets,
                        service_account_name: Some(self.name.clone()),
                        ..PodSpec::default()
                    }),
                },
                ..DeploymentSpec::default()
            }),
            ..Deployment::default()
        }
    }

    /// Defines the component's service, `None` if the component exposes no ports.
    pub fn service(&self, placement: &Placement) -> Option<Service> {
        if self.ports.is_empty() {
            return None;
        }
        let externally_routed = matches!(
            self.service_type.as_deref(),
            Some(SERVICE_TYPE_LOAD_BALANCER) | Some(SERVICE_TYPE_NODE_PORT)
        );
        let load_balanced = self.service_type.as_deref() == Some(SERVICE_TYPE_LOAD_BALANCER);

        Some(Service {
            metadata: self.metadata(placement),
            spec: Some(ServiceSpec {
                type_: self.service_type.clone(),
                external_traffic_policy: if externally_routed {
                    Some(self.traffic_policy.as_str().to_string())
                } else {
                    None
                },
                load_balancer_ip: if load_balanced {
                    self.load_balancer_ip.clone()
                } else {
                    None
                },
                selector: Some(self.selector()),
                ports: Some(
                    self.ports
                        .iter()
                        .map(|&port| ServicePort {
                            name: Some(format!("{}-{}", self.name, port)),
                            port,
                            protocol: Some(PROTOCOL_TCP.to_string()),
                            target_port: Some(IntOrString::Int(port)),
                            ..ServicePort::default()
                        })
                        .collect(),
                ),
                ..ServiceSpec::default()
            }),
            ..Service::default()
        })
    }

    /// Defines the service account the component's pods run as.
    pub fn service_account(&self, placement: &Placement) -> ServiceAccount {
        ServiceAccount {
            metadata: self.metadata(placement),
            ..ServiceAccount::default()
        }
    }

    /// Defines the component's role, `None` if the component needs no access.
    pub fn role(&self, placement: &Placement) -> Option<Role> {
        if self.rbac_rules.is_empty() {
            return None;
        }
        Some(Role {
            metadata: self.metadata(placement),
            rules: Some(self.rbac_rules.clone()),
        })
    }

    /// Binds the component's role to its service account, `None` if there is no role.
    pub fn role_binding(&self, placement: &Placement) -> Option<RoleBinding> {
        if self.rbac_rules.is_empty() {
            return None;
        }
        Some(RoleBinding {
            metadata: self.metadata(placement),
            role_ref: RoleRef {
                api_group: RBAC_API_GROUP.to_string(),
                kind: "Role".to_string(),
                name: self.name.clone(),
            },
            subjects: Some(vec![Subject {
                kind: "ServiceAccount".to_string(),
                name: self.name.clone(),
                namespace: Some(placement.namespace.clone()),
                ..Subject::default()
            }]),
        })
    }
}
