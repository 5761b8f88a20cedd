/// Helper macro to avoid retyping the API group of the control plane resource when creating
/// further string constants from it. When given no parameters, this returns the API group. When
/// given a string literal parameter it adds `/parameter` to the end.
macro_rules! iofog {
    () => {
        "iofog.org"
    };
    ($s:literal) => {
        concat!(iofog!(), "/", $s)
    };
}

// System identifiers
pub const API_GROUP: &str = iofog!();
pub const API_VERSION: &str = iofog!("v1");
pub const OPERATOR: &str = "controlplane-operator";
pub const PART_OF: &str = "iofog";

// Component names
pub const CONTROLLER: &str = "controller";
pub const KUBELET: &str = "kubelet";
pub const PORT_MANAGER: &str = "port-manager";
pub const SKUPPER: &str = "skupper";

// Label keys
pub const LABEL_NAME: &str = "name";

// Standard tags https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
pub const APP_NAME: &str = "app.kubernetes.io/name";
pub const APP_COMPONENT: &str = "app.kubernetes.io/component";
pub const APP_PART_OF: &str = "app.kubernetes.io/part-of";
pub const APP_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

// Kubernetes vocabulary used when rendering objects
pub const SERVICE_TYPE_LOAD_BALANCER: &str = "LoadBalancer";
pub const SERVICE_TYPE_NODE_PORT: &str = "NodePort";
pub const TRAFFIC_POLICY_LOCAL: &str = "Local";
pub const TRAFFIC_POLICY_CLUSTER: &str = "Cluster";
pub const PULL_POLICY_ALWAYS: &str = "Always";
pub const PROTOCOL_TCP: &str = "TCP";
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

#[test]
fn iofog_constants_macro_test() {
    assert_eq!("iofog.org", iofog!());
    assert_eq!("iofog.org/v1", API_VERSION);
}
