use crate::constants::{
    APP_COMPONENT, APP_MANAGED_BY, APP_NAME, APP_PART_OF, LABEL_NAME, OPERATOR, PART_OF,
    SERVICE_TYPE_LOAD_BALANCER, TRAFFIC_POLICY_CLUSTER, TRAFFIC_POLICY_LOCAL,
};
use k8s_openapi::api::core::v1::{
    Container, EnvVar, EnvVarSource, ExecAction, HTTPGetAction, ObjectFieldSelector, Probe,
    ResourceRequirements, SecretVolumeSource, Volume, VolumeMount,
};
use k8s_openapi::api::rbac::v1::PolicyRule;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use maplit::btreemap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything needed to run one managed component: its workload, how it is exposed, the secrets
/// it mounts and the access it is granted. Bundles are recomputed on every reconciliation and
/// never persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentBundle {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    /// Annotations placed on the pod template.
    pub annotations: BTreeMap<String, String>,
    /// Ports exposed by the component's service. No service is created when this is empty.
    pub ports: Vec<i32>,
    pub replicas: i32,
    /// The k8s service type. `None` leaves the k8s default in place.
    pub service_type: Option<String>,
    pub traffic_policy: TrafficPolicy,
    pub load_balancer_ip: Option<String>,
    pub image_pull_secret: Option<String>,
    pub containers: Vec<Container>,
    /// Secret-backed volumes. The secrets themselves are not part of the bundle.
    pub volumes: Vec<Volume>,
    pub rbac_rules: Vec<PolicyRule>,
}

impl ComponentBundle {
    /// A single replica bundle with the standard labels and nothing else.
    pub(crate) fn new<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        let name = name.into();
        Self {
            labels: standard_labels(&name),
            name,
            annotations: BTreeMap::new(),
            ports: Vec::new(),
            replicas: 1,
            service_type: None,
            traffic_policy: TrafficPolicy::Cluster,
            load_balancer_ip: None,
            image_pull_secret: None,
            containers: Vec::new(),
            volumes: Vec::new(),
            rbac_rules: Vec::new(),
        }
    }

    /// Set the service type, deriving the traffic policy from it.
    pub(crate) fn exposed_as<S>(mut self, service_type: S) -> Self
    where
        S: AsRef<str>,
    {
        let service_type = service_type.as_ref();
        self.traffic_policy = TrafficPolicy::for_service_type(service_type);
        self.service_type = non_empty(service_type);
        self
    }

    /// The names of the secrets backing this bundle's volumes.
    pub fn secret_names(&self) -> Vec<&str> {
        self.volumes
            .iter()
            .filter_map(|volume| volume.secret.as_ref())
            .filter_map(|secret| secret.secret_name.as_deref())
            .collect()
    }

    /// The labels used to select this component's pods.
    pub fn selector(&self) -> BTreeMap<String, String> {
        btreemap! { LABEL_NAME.to_string() => self.name.clone() }
    }
}

/// Whether external traffic is routed only to instances on the receiving node or balanced across
/// the cluster.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum TrafficPolicy {
    Local,
    Cluster,
}

impl TrafficPolicy {
    /// `LoadBalancer` services keep traffic local, every other service type is cluster-wide.
    pub fn for_service_type(service_type: &str) -> Self {
        if service_type == SERVICE_TYPE_LOAD_BALANCER {
            TrafficPolicy::Local
        } else {
            TrafficPolicy::Cluster
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficPolicy::Local => TRAFFIC_POLICY_LOCAL,
            TrafficPolicy::Cluster => TRAFFIC_POLICY_CLUSTER,
        }
    }
}

fn standard_labels(name: &str) -> BTreeMap<String, String> {
    [
        (LABEL_NAME, name),
        (APP_NAME, name),
        (APP_COMPONENT, name),
        (APP_PART_OF, PART_OF),
        (APP_MANAGED_BY, OPERATOR),
    ]
    .iter()
    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
    .collect()
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// CPU and memory limits and requests for a container.
pub(crate) struct Resources {
    pub(crate) cpu_limit: &'static str,
    pub(crate) memory_limit: &'static str,
    pub(crate) cpu_request: &'static str,
    pub(crate) memory_request: &'static str,
}

impl Resources {
    pub(crate) fn requirements(&self) -> ResourceRequirements {
        ResourceRequirements {
            limits: Some(btreemap! {
                "cpu".to_string() => Quantity(self.cpu_limit.to_string()),
                "memory".to_string() => Quantity(self.memory_limit.to_string()),
            }),
            requests: Some(btreemap! {
                "cpu".to_string() => Quantity(self.cpu_request.to_string()),
                "memory".to_string() => Quantity(self.memory_request.to_string()),
            }),
        }
    }
}

/// The limits shared by the kubelet, port manager and skupper containers.
pub(crate) const SMALL_RESOURCES: Resources = Resources {
    cpu_limit: "200m",
    memory_limit: "1Gi",
    cpu_request: "50m",
    memory_request: "200Mi",
};

/// Probe timings, left unset fields take the k8s defaults.
#[derive(Default)]
pub(crate) struct Timing {
    pub(crate) initial_delay: Option<i32>,
    pub(crate) period: Option<i32>,
    pub(crate) failure_threshold: Option<i32>,
}

pub(crate) fn http_probe(path: &str, port: i32, timing: Timing) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(path.to_string()),
            port: IntOrString::Int(port),
            ..HTTPGetAction::default()
        }),
        initial_delay_seconds: timing.initial_delay,
        period_seconds: timing.period,
        failure_threshold: timing.failure_threshold,
        ..Probe::default()
    }
}

pub(crate) fn exec_probe(command: &[&str], timing: Timing) -> Probe {
    Probe {
        exec: Some(ExecAction {
            command: Some(command.iter().map(|s| s.to_string()).collect()),
        }),
        initial_delay_seconds: timing.initial_delay,
        period_seconds: timing.period,
        failure_threshold: timing.failure_threshold,
        ..Probe::default()
    }
}

/// Plain environment variables. Empty values are left unset because k8s does not store them.
pub(crate) fn env_vars<'a, I>(raw_vars: I) -> Vec<EnvVar>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    raw_vars
        .into_iter()
        .map(|(name, value)| EnvVar {
            name: name.to_owned(),
            value: if value.is_empty() { None } else { Some(value) },
            value_from: None,
        })
        .collect()
}

/// An environment variable resolved by k8s from the pod's own fields, e.g. `status.podIP`.
pub(crate) fn field_env_var(name: &str, field_path: &str) -> EnvVar {
    EnvVar {
        name: name.to_owned(),
        value: None,
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.to_owned(),
                ..ObjectFieldSelector::default()
            }),
            ..EnvVarSource::default()
        }),
    }
}

/// A volume backed by the secret of the same name.
pub(crate) fn secret_volume(name: &str) -> Volume {
    Volume {
        name: name.to_owned(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(name.to_owned()),
            ..SecretVolumeSource::default()
        }),
        ..Volume::default()
    }
}

pub(crate) fn mount(name: &str, base_path: &str) -> VolumeMount {
    VolumeMount {
        name: name.to_owned(),
        mount_path: format!("{}/{}", base_path.trim_end_matches('/'), name),
        ..VolumeMount::default()
    }
}
