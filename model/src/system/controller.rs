use crate::constants::{CONTROLLER, PULL_POLICY_ALWAYS};
use crate::system::bundle::{env_vars, http_probe, non_empty, ComponentBundle, Resources, Timing};
use crate::ControllerSettings;
use k8s_openapi::api::core::v1::Container;

/// The port the controller serves its API on.
pub const CONTROLLER_API_PORT: i32 = 51121;
/// The port the controller serves its web console on.
pub const CONTROLLER_HTTP_PORT: i32 = 80;

const STATUS_PATH: &str = "/api/v3/status";
const READINESS_INITIAL_DELAY: i32 = 1;
const READINESS_PERIOD: i32 = 4;
const READINESS_FAILURE_THRESHOLD: i32 = 3;

const RESOURCES: Resources = Resources {
    cpu_limit: "1800m",
    memory_limit: "3Gi",
    cpu_request: "400m",
    memory_request: "1Gi",
};

/// Defines the ioFog controller. A requested replica count of zero yields one replica.
pub fn controller_bundle(settings: &ControllerSettings) -> ComponentBundle {
    let db = &settings.database;
    let mut bundle = ComponentBundle::new(CONTROLLER).exposed_as(&settings.service_type);
    bundle.replicas = if settings.replicas == 0 {
        1
    } else {
        settings.replicas
    };
    bundle.ports = vec![CONTROLLER_API_PORT, CONTROLLER_HTTP_PORT];
    bundle.load_balancer_ip = non_empty(&settings.load_balancer_ip);
    bundle.image_pull_secret = settings
        .image_pull_secret
        .as_deref()
        .and_then(non_empty);
    bundle.containers = vec![Container {
        name: CONTROLLER.to_string(),
        image: Some(settings.image.clone()),
        image_pull_policy: Some(PULL_POLICY_ALWAYS.to_string()),
        readiness_probe: Some(http_probe(
            STATUS_PATH,
            CONTROLLER_API_PORT,
            Timing {
                initial_delay: Some(READINESS_INITIAL_DELAY),
                period: Some(READINESS_PERIOD),
                failure_threshold: Some(READINESS_FAILURE_THRESHOLD),
            },
        )),
        env: Some(env_vars(vec![
            ("DB_PROVIDER", db.provider.clone()),
            ("DB_NAME", db.database_name.clone()),
            ("DB_USERNAME", db.user.clone()),
            ("DB_PASSWORD", db.password.clone()),
            ("DB_HOST", db.host.clone()),
            ("DB_PORT", db.port.to_string()),
        ])),
        resources: Some(RESOURCES.requirements()),
        ..Container::default()
    }];
    bundle
}
