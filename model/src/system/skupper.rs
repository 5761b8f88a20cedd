use crate::constants::{PULL_POLICY_ALWAYS, SERVICE_TYPE_LOAD_BALANCER, SKUPPER};
use crate::system::bundle::{
    env_vars, field_env_var, http_probe, mount, secret_volume, ComponentBundle, Timing,
    SMALL_RESOURCES,
};
use crate::SkupperSettings;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::api::rbac::v1::PolicyRule;

pub const SKUPPER_AMQPS_PORT: i32 = 5671;
pub const SKUPPER_HTTP_PORT: i32 = 9090;
pub const SKUPPER_INTERIOR_PORT: i32 = 55671;
pub const SKUPPER_EDGE_PORT: i32 = 45671;

/// Secret holding the certificates used between routers.
pub const SKUPPER_INTERNAL_SECRET: &str = "skupper-internal";
/// Secret holding the certificates used by AMQPS clients.
pub const SKUPPER_AMQPS_SECRET: &str = "skupper-amqps";

const APPLICATION: &str = "skupper-router";
const HEALTH_PATH: &str = "/healthz";
const LIVENESS_INITIAL_DELAY: i32 = 60;

/// The qdrouterd configuration the router is started with. Certificate paths assume the default
/// mount path.
const ROUTER_CONFIG: &str = r#"
router {
    mode: interior
    id: ${HOSTNAME}
}

listener {
    host: localhost
    port: 5672
    role: normal
}

sslProfile {
    name: skupper-amqps
    certFile: /etc/qpid-dispatch-certs/skupper-amqps/tls.crt
    privateKeyFile: /etc/qpid-dispatch-certs/skupper-amqps/tls.key
    caCertFile: /etc/qpid-dispatch-certs/skupper-amqps/ca.crt
}

listener {
    host: 0.0.0.0
    port: 5671
    role: normal
    sslProfile: skupper-amqps
    saslMechanisms: EXTERNAL
    authenticatePeer: true
}

listener {
    host: 0.0.0.0
    port: 9090
    role: normal
    http: true
    httpRootDir: disabled
    websockets: false
    healthz: true
    metrics: true
}

sslProfile {
    name: skupper-internal
    certFile: /etc/qpid-dispatch-certs/skupper-internal/tls.crt
    privateKeyFile: /etc/qpid-dispatch-certs/skupper-internal/tls.key
    caCertFile: /etc/qpid-dispatch-certs/skupper-internal/ca.crt
}

listener {
    role: inter-router
    host: 0.0.0.0
    port: 55671
    sslProfile: skupper-internal
    saslMechanisms: EXTERNAL
    authenticatePeer: true
}

listener {
    role: edge
    host: 0.0.0.0
    port: 45671
    sslProfile: skupper-internal
    saslMechanisms: EXTERNAL
    authenticatePeer: true
}
"#;

/// Defines the skupper router. The `skupper-internal` and `skupper-amqps` secrets are mounted
/// under `settings.volume_mount_path` but are not created here.
pub fn skupper_bundle(settings: &SkupperSettings) -> ComponentBundle {
    let mut bundle = ComponentBundle::new(SKUPPER).exposed_as(SERVICE_TYPE_LOAD_BALANCER);
    bundle
        .labels
        .insert("application".to_string(), APPLICATION.to_string());
    bundle
        .labels
        .insert("skupper.io/component".to_string(), "router".to_string());
    bundle.annotations.insert(
        "prometheus.io/port".to_string(),
        SKUPPER_HTTP_PORT.to_string(),
    );
    bundle
        .annotations
        .insert("prometheus.io/scrape".to_string(), "true".to_string());
    bundle.ports = vec![
        SKUPPER_AMQPS_PORT,
        SKUPPER_HTTP_PORT,
        SKUPPER_INTERIOR_PORT,
        SKUPPER_EDGE_PORT,
    ];
    bundle.rbac_rules = vec![PolicyRule {
        api_groups: Some(vec![String::new()]),
        resources: Some(vec!["pods".to_string()]),
        verbs: vec!["get", "list", "watch"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        ..PolicyRule::default()
    }];
    bundle.volumes = vec![
        secret_volume(SKUPPER_INTERNAL_SECRET),
        secret_volume(SKUPPER_AMQPS_SECRET),
    ];

    let mut env = env_vars(vec![
        ("APPLICATION_NAME", APPLICATION.to_string()),
        ("QDROUTERD_AUTO_MESH_DISCOVERY", "QUERY".to_string()),
        ("QDROUTERD_CONF", ROUTER_CONFIG.to_string()),
    ]);
    env.push(field_env_var("POD_NAMESPACE", "metadata.namespace"));
    env.push(field_env_var("POD_IP", "status.podIP"));

    bundle.containers = vec![Container {
        name: SKUPPER.to_string(),
        image: Some(settings.image.clone()),
        image_pull_policy: Some(PULL_POLICY_ALWAYS.to_string()),
        liveness_probe: Some(http_probe(
            HEALTH_PATH,
            SKUPPER_HTTP_PORT,
            Timing {
                initial_delay: Some(LIVENESS_INITIAL_DELAY),
                ..Timing::default()
            },
        )),
        env: Some(env),
        volume_mounts: Some(vec![
            mount(SKUPPER_INTERNAL_SECRET, &settings.volume_mount_path),
            mount(SKUPPER_AMQPS_SECRET, &settings.volume_mount_path),
        ]),
        resources: Some(SMALL_RESOURCES.requirements()),
        ..Container::default()
    }];
    bundle
}
