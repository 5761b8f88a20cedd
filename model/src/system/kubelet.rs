use crate::constants::{KUBELET, PULL_POLICY_ALWAYS};
use crate::system::bundle::{ComponentBundle, SMALL_RESOURCES};
use k8s_openapi::api::core::v1::Container;

pub const KUBELET_PORT: i32 = 60000;

/// The number of arguments the kubelet container is given.
pub const KUBELET_ARG_COUNT: usize = 6;
/// The position of the token value in the kubelet container's arguments.
pub const KUBELET_TOKEN_ARG_INDEX: usize = 3;

const NAMESPACE_FLAG: &str = "--namespace";
const TOKEN_FLAG: &str = "--iofog-token";
const CONTROLLER_URL_FLAG: &str = "--iofog-url";

/// Defines the ioFog kubelet, which registers with the controller at `controller_endpoint`
/// (`host:port`) using `token`.
pub fn kubelet_bundle(
    image: &str,
    namespace: &str,
    token: &str,
    controller_endpoint: &str,
) -> ComponentBundle {
    let mut bundle = ComponentBundle::new(KUBELET);
    bundle.ports = vec![KUBELET_PORT];
    bundle.containers = vec![Container {
        name: KUBELET.to_string(),
        image: Some(image.to_string()),
        image_pull_policy: Some(PULL_POLICY_ALWAYS.to_string()),
        args: Some(vec![
            NAMESPACE_FLAG.to_string(),
            namespace.to_string(),
            TOKEN_FLAG.to_string(),
            token.to_string(),
            CONTROLLER_URL_FLAG.to_string(),
            format!("http://{}", controller_endpoint),
        ]),
        resources: Some(SMALL_RESOURCES.requirements()),
        ..Container::default()
    }];
    bundle
}

#[cfg(test)]
mod test {
    use super::*;
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

    #[test]
    fn kubelet_args_are_ordered() {
        let bundle = kubelet_bundle("kubelet:v1", "ns1", "TOK123", "10.0.0.1:51121");
        assert_eq!(bundle.name, "kubelet");
        assert_eq!(bundle.replicas, 1);
        assert_eq!(bundle.ports, vec![60000]);
        assert_eq!(bundle.service_type, None);

        let args = bundle.containers[0].args.as_ref().unwrap();
        assert_eq!(
            args,
            &vec![
                "--namespace",
                "ns1",
                "--iofog-token",
                "TOK123",
                "--iofog-url",
                "http://10.0.0.1:51121"
            ]
        );
        assert_eq!(args.len(), KUBELET_ARG_COUNT);
        assert_eq!(args[KUBELET_TOKEN_ARG_INDEX], "TOK123");
    }

    #[test]
    fn kubelet_resources() {
        let bundle = kubelet_bundle("kubelet:v1", "ns1", "TOK123", "ep");
        let resources = bundle.containers[0].resources.as_ref().unwrap();
        let limits = resources.limits.as_ref().unwrap();
        assert_eq!(limits["cpu"], Quantity("200m".into()));
        assert_eq!(limits["memory"], Quantity("1Gi".into()));
        let requests = resources.requests.as_ref().unwrap();
        assert_eq!(requests["cpu"], Quantity("50m".into()));
        assert_eq!(requests["memory"], Quantity("200Mi".into()));
    }

    #[test]
    fn kubelet_builder_is_deterministic() {
        let first = kubelet_bundle("kubelet:v1", "ns1", "TOK123", "10.0.0.1:51121");
        let second = kubelet_bundle("kubelet:v1", "ns1", "TOK123", "10.0.0.1:51121");
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
