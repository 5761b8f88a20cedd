/*!

This library reconciles ioFog control planes. Every `ControlPlane` object is driven to the state
its spec describes by converging the deployments, services, service accounts and RBAC objects of
the controller, the kubelet, the port manager and the skupper router, in that order.

The [`Orchestrator`] runs one reconciliation pass. It reaches the cluster only through the
[`LiveState`] trait and obtains new kubelet tokens through the [`TokenSource`] trait, so both can
be replaced in tests.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

mod component;
mod converge;
pub mod dispatch;
mod error;
mod live;
mod logging;
mod orchestrator;
mod settings;
mod token;

pub use component::ControllerEndpoint;
pub use converge::Convergence;
pub use error::{Error, Result, TokenError};
pub use live::{KubeLiveState, KubeResult, LiveState, ManagedObject};
pub use logging::{Logger, PassLogger};
pub use orchestrator::{Orchestrator, PassOutcome};
pub use settings::{Settings, ENV_PREFIX};
pub use token::{TokenSource, UuidTokenSource};
