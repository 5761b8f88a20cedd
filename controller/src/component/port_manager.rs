use crate::component::{converge_bundle, ComponentReconciler};
use crate::error::Result;
use crate::live::LiveState;
use crate::logging::PassLogger;
use async_trait::async_trait;
use model::constants::PORT_MANAGER;
use model::system::{port_manager_bundle, Placement};
use model::{Credentials, PortManagerSettings};

/// Converges the port manager, which logs into the controller with the decoded user credentials.
pub(crate) struct PortManagerReconciler<'a> {
    pub(crate) settings: &'a PortManagerSettings,
    pub(crate) credentials: &'a Credentials,
}

#[async_trait]
impl<'a> ComponentReconciler for PortManagerReconciler<'a> {
    type Output = ();

    fn name(&self) -> &'static str {
        PORT_MANAGER
    }

    async fn reconcile<L>(&self, live: &L, placement: &Placement, log: &PassLogger) -> Result<()>
    where
        L: LiveState,
    {
        let bundle = port_manager_bundle(self.settings, self.credentials);
        converge_bundle(live, &bundle, placement, log).await?;
        Ok(())
    }
}
