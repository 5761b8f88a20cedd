/*!

One reconciler per managed component. Each builds its component's bundle from the `ControlPlane`
spec and converges the live objects rendered from it.

!*/

mod controller;
mod kubelet;
mod port_manager;
mod skupper;

pub use controller::ControllerEndpoint;
pub(crate) use controller::ControllerReconciler;
pub(crate) use kubelet::KubeletReconciler;
pub(crate) use port_manager::PortManagerReconciler;
pub(crate) use skupper::SkupperReconciler;

use crate::converge::{converge, Convergence};
use crate::error::Result;
use crate::live::LiveState;
use crate::logging::PassLogger;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use model::system::{ComponentBundle, Placement};

/// Brings one managed component to the state described by the `ControlPlane` spec.
#[async_trait]
pub(crate) trait ComponentReconciler: Send + Sync {
    /// A value derived from the component's live state that later components depend on.
    type Output: Send;

    fn name(&self) -> &'static str;

    async fn reconcile<L>(
        &self,
        live: &L,
        placement: &Placement,
        log: &PassLogger,
    ) -> Result<Self::Output>
    where
        L: LiveState;
}

/// Converge every object rendered from `bundle` and return the live service, if the bundle has
/// one. The service account and RBAC objects are converged before the deployment that uses them.
pub(crate) async fn converge_bundle<L>(
    live: &L,
    bundle: &ComponentBundle,
    placement: &Placement,
    log: &PassLogger,
) -> Result<Option<Service>>
where
    L: LiveState,
{
    let component = bundle.name.as_str();
    let namespace = placement.namespace.as_str();
    let mut outcomes = Vec::new();

    let (outcome, _) = converge(
        live,
        component,
        namespace,
        bundle.service_account(placement),
        log,
    )
    .await?;
    outcomes.push(outcome);

    if let Some(role) = bundle.role(placement) {
        let (outcome, _) = converge(live, component, namespace, role, log).await?;
        outcomes.push(outcome);
    }
    if let Some(role_binding) = bundle.role_binding(placement) {
        let (outcome, _) = converge(live, component, namespace, role_binding, log).await?;
        outcomes.push(outcome);
    }

    let (outcome, _) =
        converge(live, component, namespace, bundle.deployment(placement), log).await?;
    outcomes.push(outcome);

    let service = match bundle.service(placement) {
        Some(service) => {
            let (outcome, service) = converge(live, component, namespace, service, log).await?;
            outcomes.push(outcome);
            Some(service)
        }
        None => None,
    };

    let changed = outcomes
        .iter()
        .filter(|&&outcome| outcome != Convergence::Unchanged)
        .count();
    if changed == 0 {
        log.debug(format!("Component '{}' is up to date", component));
    } else {
        log.info(format!(
            "Converged {} object(s) of component '{}'",
            changed, component
        ));
    }
    Ok(service)
}
