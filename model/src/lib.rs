/*!

This library provides the `ControlPlane` custom resource definition and the builders that turn it
into the k8s objects making up an ioFog control plane.

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

pub use control_plane::{
    ControlPlane, ControlPlaneSpec, ControllerSettings, Credentials, Database, IofogUser,
    KubeletSettings, PortManagerSettings, SkupperSettings,
};
pub use credentials::decode;
pub use error::{Error, Result};

pub mod constants;
mod control_plane;
mod credentials;
mod error;
pub mod system;
