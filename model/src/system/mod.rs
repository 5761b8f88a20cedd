/*!

Builds the declarative bundles for the managed control plane components and renders them into
k8s objects.

!*/

mod bundle;
mod controller;
mod kubelet;
mod port_manager;
mod render;
mod skupper;

pub use bundle::{ComponentBundle, TrafficPolicy};
pub use controller::{controller_bundle, CONTROLLER_API_PORT, CONTROLLER_HTTP_PORT};
pub use kubelet::{kubelet_bundle, KUBELET_ARG_COUNT, KUBELET_PORT, KUBELET_TOKEN_ARG_INDEX};
pub use port_manager::port_manager_bundle;
pub use render::Placement;
pub use skupper::{
    skupper_bundle, SKUPPER_AMQPS_PORT, SKUPPER_AMQPS_SECRET, SKUPPER_EDGE_PORT,
    SKUPPER_HTTP_PORT, SKUPPER_INTERIOR_PORT, SKUPPER_INTERNAL_SECRET,
};
