use crate::credentials::decode;
use crate::error::{self, Result};
use kube::{CustomResource, CustomResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

/// The desired state of an ioFog control plane. The `CustomResource` derive also produces a struct
/// named `ControlPlane` which represents the object in the k8s API.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[kube(
    derive = "Default",
    derive = "PartialEq",
    group = "iofog.org",
    kind = "ControlPlane",
    namespaced,
    plural = "controlplanes",
    singular = "controlplane",
    version = "v1"
)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneSpec {
    /// The central ioFog controller.
    pub controller: ControllerSettings,
    /// The kubelet bridging the controller's agents into this cluster.
    pub kubelet: KubeletSettings,
    /// The port manager exposing microservice ports from the edge.
    pub port_manager: PortManagerSettings,
    /// The skupper router connecting edge and cluster networks.
    pub skupper: SkupperSettings,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSettings {
    /// Requested replica count, zero is treated as one.
    #[serde(default)]
    pub replicas: i32,
    /// The URI of the controller container image.
    pub image: String,
    /// The name of an image registry pull secret if one is needed to pull the controller image.
    #[serde(default)]
    pub image_pull_secret: Option<String>,
    /// The k8s service type used to expose the controller, e.g. `LoadBalancer`. The k8s default
    /// is used when empty.
    #[serde(default)]
    pub service_type: String,
    /// A load balancer IP to request when `service_type` is `LoadBalancer`.
    #[serde(default)]
    pub load_balancer_ip: String,
    pub database: Database,
    pub user: IofogUser,
}

/// Connection parameters for the controller's database. These are passed to the controller
/// verbatim.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: i32,
}

/// The controller user. The password is stored base64 encoded.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IofogUser {
    pub email: String,
    pub password: String,
}

impl IofogUser {
    /// Decode the stored password into a set of plaintext `Credentials`.
    pub fn decode(&self) -> Result<Credentials> {
        Ok(Credentials {
            email: self.email.clone(),
            password: decode(&self.password)?,
        })
    }
}

/// A decoded controller user. Only obtainable through [`IofogUser::decode`], so holding one means
/// the password has already been decoded.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeletSettings {
    pub image: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortManagerSettings {
    /// The namespace the port manager watches for microservice ports.
    pub watch_namespace: String,
    pub image: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkupperSettings {
    pub image: String,
    /// The directory under which the skupper secrets are mounted.
    #[serde(default = "default_volume_mount_path")]
    pub volume_mount_path: String,
}

fn default_volume_mount_path() -> String {
    String::from("/etc/qpid-dispatch-certs")
}

impl ControlPlane {
    /// Returns the `ControlPlane` CRD definition as YAML, e.g. for installation.
    pub fn crd_yaml() -> Result<String> {
        Ok(serde_yaml::to_string(&Self::crd()).context(error::CrdYamlSnafu)?)
    }
}
