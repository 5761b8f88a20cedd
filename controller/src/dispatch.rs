/*!

Delivers `ControlPlane` events to the [`Orchestrator`]. Passes are retried by requeueing the
`ControlPlane`, converged control planes are periodically reconciled again to undo out-of-band
changes.

!*/

use crate::live::{KubeLiveState, LiveState};
use crate::logging::Logger;
use crate::orchestrator::{Orchestrator, PassOutcome};
use crate::settings::Settings;
use crate::token::{TokenSource, UuidTokenSource};
use crate::Error;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::api::ListParams;
use kube::{Api, Client, Resource};
use kube_runtime::controller::{self, Action};
use kube_runtime::Controller;
use log::{debug, error, info, trace};
use model::ControlPlane;
use std::sync::Arc;

/// Everything a pass needs, shared by all passes.
pub struct Dispatch<L, T> {
    orchestrator: Orchestrator<L, T>,
    settings: Settings,
}

impl<L, T> Dispatch<L, T>
where
    L: LiveState,
    T: TokenSource,
{
    pub fn new(orchestrator: Orchestrator<L, T>, settings: Settings) -> Self {
        Self {
            orchestrator,
            settings,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<L, T> {
        &self.orchestrator
    }
}

/// Watch `ControlPlane` objects and the deployments and services they own, reconciling until the
/// watch ends.
pub async fn run_control_plane_controller(client: Client, settings: Settings) {
    let (control_planes, deployments, services) = match settings.watch_namespace.as_deref() {
        Some(namespace) => {
            info!("Watching namespace '{}'", namespace);
            (
                Api::<ControlPlane>::namespaced(client.clone(), namespace),
                Api::<Deployment>::namespaced(client.clone(), namespace),
                Api::<Service>::namespaced(client.clone(), namespace),
            )
        }
        None => {
            info!("Watching all namespaces");
            (
                Api::<ControlPlane>::all(client.clone()),
                Api::<Deployment>::all(client.clone()),
                Api::<Service>::all(client.clone()),
            )
        }
    };

    let dispatch = Arc::new(Dispatch::new(
        Orchestrator::new(
            KubeLiveState::new(client),
            UuidTokenSource,
            Logger::global(),
        ),
        settings,
    ));

    Controller::new(control_planes, ListParams::default())
        .owns(deployments, ListParams::default())
        .owns(services, ListParams::default())
        .run(reconcile, error_policy, dispatch)
        .for_each(|reconciliation_result| async move {
            match reconciliation_result {
                Ok((object, _)) => trace!("Reconciled {}", object),
                Err(e @ controller::Error::ObjectNotFound { .. }) => {
                    debug!("Object is gone: {}", e)
                }
                Err(e) => error!("Error during reconciliation: {}", e),
            }
        })
        .await;
}

/// Run a pass for the `ControlPlane` that triggered an event. The object is fetched again by the
/// orchestrator so that the pass works from its current version.
pub async fn reconcile<L, T>(
    control_plane: Arc<ControlPlane>,
    dispatch: Arc<Dispatch<L, T>>,
) -> crate::Result<Action>
where
    L: LiveState,
    T: TokenSource,
{
    let meta = control_plane.meta();
    let namespace = meta.namespace.as_deref().unwrap_or_default();
    let name = meta.name.as_deref().unwrap_or_default();
    match dispatch.orchestrator.reconcile(namespace, name).await? {
        PassOutcome::NotFound => Ok(Action::await_change()),
        PassOutcome::Converged => Ok(Action::requeue(dispatch.settings.resync())),
    }
}

/// Retry a failed pass after the configured delay.
pub fn error_policy<L, T>(
    control_plane: Arc<ControlPlane>,
    e: &Error,
    dispatch: Arc<Dispatch<L, T>>,
) -> Action
where
    L: LiveState,
    T: TokenSource,
{
    let meta = control_plane.meta();
    error!(
        "Reconciliation of control plane '{}/{}' failed: {}",
        meta.namespace.as_deref().unwrap_or_default(),
        meta.name.as_deref().unwrap_or_default(),
        e
    );
    Action::requeue(dispatch.settings.error_requeue())
}
