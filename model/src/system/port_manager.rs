use crate::constants::{PORT_MANAGER, PULL_POLICY_ALWAYS};
use crate::system::bundle::{env_vars, exec_probe, ComponentBundle, Timing, SMALL_RESOURCES};
use crate::{Credentials, PortManagerSettings};
use k8s_openapi::api::core::v1::Container;

/// The port manager touches this file once it is ready.
const READY_SENTINEL: &str = "/tmp/operator-sdk-ready";
const READINESS_INITIAL_DELAY: i32 = 4;
const READINESS_PERIOD: i32 = 10;
const READINESS_FAILURE_THRESHOLD: i32 = 1;

/// Defines the port manager. It logs into the controller as `credentials`, which must already be
/// decoded.
pub fn port_manager_bundle(
    settings: &PortManagerSettings,
    credentials: &Credentials,
) -> ComponentBundle {
    let mut bundle = ComponentBundle::new(PORT_MANAGER);
    bundle.containers = vec![Container {
        name: PORT_MANAGER.to_string(),
        image: Some(settings.image.clone()),
        image_pull_policy: Some(PULL_POLICY_ALWAYS.to_string()),
        readiness_probe: Some(exec_probe(
            &["stat", READY_SENTINEL],
            Timing {
                initial_delay: Some(READINESS_INITIAL_DELAY),
                period: Some(READINESS_PERIOD),
                failure_threshold: Some(READINESS_FAILURE_THRESHOLD),
            },
        )),
        env: Some(env_vars(vec![
            ("WATCH_NAMESPACE", settings.watch_namespace.clone()),
            ("IOFOG_USER_EMAIL", credentials.email().to_string()),
            ("IOFOG_USER_PASS", credentials.password().to_string()),
        ])),
        resources: Some(SMALL_RESOURCES.requirements()),
        ..Container::default()
    }];
    bundle
}
