use crate::component::{
    ComponentReconciler, ControllerReconciler, KubeletReconciler, PortManagerReconciler,
    SkupperReconciler,
};
use crate::error::{self, Result};
use crate::live::LiveState;
use crate::logging::{Logger, PassLogger};
use crate::token::TokenSource;
use kube::Resource;
use model::system::Placement;
use model::ControlPlane;
use snafu::{OptionExt, ResultExt};

/// How a reconciliation pass ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PassOutcome {
    /// The `ControlPlane` was deleted before the pass began. Its objects are garbage collected by
    /// k8s.
    NotFound,
    /// Every component matches the `ControlPlane` spec.
    Converged,
}

/// Drives the components of a `ControlPlane` to the state its spec describes. Components are
/// reconciled one at a time in dependency order and the pass stops at the first error.
pub struct Orchestrator<L, T> {
    live: L,
    tokens: T,
    logger: Logger,
}

impl<L, T> Orchestrator<L, T>
where
    L: LiveState,
    T: TokenSource,
{
    pub fn new(live: L, tokens: T, logger: Logger) -> Self {
        Self {
            live,
            tokens,
            logger,
        }
    }

    pub fn live(&self) -> &L {
        &self.live
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Run one reconciliation pass for the `ControlPlane` named `name` in `namespace`.
    pub async fn reconcile(&self, namespace: &str, name: &str) -> Result<PassOutcome> {
        let log = self.logger.for_pass(namespace, name);
        log.debug("Reconciling");

        let control_plane = self
            .live
            .get::<ControlPlane>(namespace, name)
            .await
            .context(error::ControlPlaneApiSnafu {
                operation: "get",
                namespace,
                name,
            })?;
        let control_plane = match control_plane {
            Some(control_plane) => control_plane,
            None => {
                log.info("Control plane no longer exists, nothing to do");
                return Ok(PassOutcome::NotFound);
            }
        };

        let spec = &control_plane.spec;
        let credentials = spec
            .controller
            .user
            .decode()
            .context(error::DecodePasswordSnafu {
                control_plane: log.key(),
            })?;
        let owner = control_plane
            .controller_owner_ref(&())
            .context(error::MissingUidSnafu {
                control_plane: log.key(),
            })?;
        let placement = Placement {
            namespace: namespace.to_string(),
            owner,
        };

        let endpoint = self
            .run(
                ControllerReconciler {
                    settings: &spec.controller,
                },
                &placement,
                &log,
            )
            .await?;
        self.run(
            KubeletReconciler {
                image: &spec.kubelet.image,
                endpoint: &endpoint,
                tokens: &self.tokens,
            },
            &placement,
            &log,
        )
        .await?;
        self.run(
            PortManagerReconciler {
                settings: &spec.port_manager,
                credentials: &credentials,
            },
            &placement,
            &log,
        )
        .await?;
        self.run(
            SkupperReconciler {
                settings: &spec.skupper,
            },
            &placement,
            &log,
        )
        .await?;

        log.info("Control plane converged");
        Ok(PassOutcome::Converged)
    }

    async fn run<R>(&self, reconciler: R, placement: &Placement, log: &PassLogger) -> Result<R::Output>
    where
        R: ComponentReconciler,
    {
        log.debug(format!("Reconciling component '{}'", reconciler.name()));
        let result = reconciler.reconcile(&self.live, placement, log).await;
        if let Err(e) = &result {
            log.warn(format!(
                "Reconciling component '{}' failed: {}",
                reconciler.name(),
                e
            ));
        }
        result
    }
}
