use crate::component::{converge_bundle, ComponentReconciler};
use crate::error::{self, Result};
use crate::live::LiveState;
use crate::logging::PassLogger;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use model::constants::{CONTROLLER, SERVICE_TYPE_LOAD_BALANCER};
use model::system::{controller_bundle, Placement, CONTROLLER_API_PORT};
use model::ControllerSettings;
use snafu::OptionExt;
use std::fmt::{Display, Formatter};

/// Where the ioFog controller's API can be reached.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControllerEndpoint {
    host: String,
    port: i32,
}

impl ControllerEndpoint {
    pub fn new<S>(host: S, port: i32) -> Self
    where
        S: Into<String>,
    {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> i32 {
        self.port
    }

    /// The endpoint of the controller's API as exposed by its live `service`. Load balanced
    /// services are reached through their first ingress, every other service through its cluster
    /// IP. `None` until k8s has assigned the address.
    pub(crate) fn from_service(service: &Service) -> Option<Self> {
        let spec = service.spec.as_ref()?;
        let host = if spec.type_.as_deref() == Some(SERVICE_TYPE_LOAD_BALANCER) {
            service
                .status
                .as_ref()
                .and_then(|status| status.load_balancer.as_ref())
                .and_then(|load_balancer| load_balancer.ingress.as_ref())
                .and_then(|ingress| ingress.first())
                .and_then(|ingress| {
                    ingress
                        .ip
                        .as_deref()
                        .filter(|ip| !ip.is_empty())
                        .or_else(|| ingress.hostname.as_deref())
                })
        } else {
            spec.cluster_ip.as_deref()
        };
        host.filter(|host| !host.is_empty() && *host != "None")
            .map(|host| Self::new(host, CONTROLLER_API_PORT))
    }
}

impl Display for ControllerEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Converges the ioFog controller and reports the endpoint of its API.
pub(crate) struct ControllerReconciler<'a> {
    pub(crate) settings: &'a ControllerSettings,
}

#[async_trait]
impl<'a> ComponentReconciler for ControllerReconciler<'a> {
    type Output = ControllerEndpoint;

    fn name(&self) -> &'static str {
        CONTROLLER
    }

    async fn reconcile<L>(
        &self,
        live: &L,
        placement: &Placement,
        log: &PassLogger,
    ) -> Result<Self::Output>
    where
        L: LiveState,
    {
        let bundle = controller_bundle(self.settings);
        let service = converge_bundle(live, &bundle, placement, log).await?;
        let endpoint = service
            .as_ref()
            .and_then(ControllerEndpoint::from_service)
            .context(error::EndpointPendingSnafu {
                component: CONTROLLER,
                service: &bundle.name,
            })?;
        log.debug(format!("The controller API is at '{}'", endpoint));
        Ok(endpoint)
    }
}
