use crate::error::{self, Result};
use serde::Deserialize;
use snafu::ResultExt;
use std::time::Duration;

/// The prefix of every environment variable read into [`Settings`].
pub const ENV_PREFIX: &str = "CONTROLPLANE_";

/// Operator settings, read from `CONTROLPLANE_*` environment variables.
///
/// # Example
///
/// ```text
/// CONTROLPLANE_WATCH_NAMESPACE=iofog
/// CONTROLPLANE_ERROR_REQUEUE_SECS=30
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Settings {
    /// Only `ControlPlane` objects in this namespace are reconciled. All namespaces are watched
    /// when this is not set.
    #[serde(default)]
    pub watch_namespace: Option<String>,
    /// How long to wait before retrying a failed reconciliation pass.
    #[serde(default = "default_error_requeue_secs")]
    pub error_requeue_secs: u64,
    /// How long to wait before reconciling a converged `ControlPlane` again.
    #[serde(default = "default_resync_secs")]
    pub resync_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        envy::prefixed(ENV_PREFIX)
            .from_env()
            .context(error::SettingsSnafu)
    }

    /// Reads settings from `(name, value)` pairs as though they were environment variables.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .context(error::SettingsSnafu)
    }

    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }

    pub fn resync(&self) -> Duration {
        Duration::from_secs(self.resync_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            error_requeue_secs: default_error_requeue_secs(),
            resync_secs: default_resync_secs(),
        }
    }
}

fn default_error_requeue_secs() -> u64 {
    10
}

fn default_resync_secs() -> u64 {
    300
}
