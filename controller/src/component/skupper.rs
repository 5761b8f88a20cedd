use crate::component::{converge_bundle, ComponentReconciler};
use crate::error::{self, Result};
use crate::live::LiveState;
use crate::logging::PassLogger;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use model::constants::SKUPPER;
use model::system::{skupper_bundle, Placement};
use model::SkupperSettings;
use snafu::{ensure, ResultExt};

/// Converges the skupper router. The secrets it mounts are created by whoever bootstraps the
/// router's certificates, so they are only checked for here.
pub(crate) struct SkupperReconciler<'a> {
    pub(crate) settings: &'a SkupperSettings,
}

#[async_trait]
impl<'a> ComponentReconciler for SkupperReconciler<'a> {
    type Output = ();

    fn name(&self) -> &'static str {
        SKUPPER
    }

    async fn reconcile<L>(&self, live: &L, placement: &Placement, log: &PassLogger) -> Result<()>
    where
        L: LiveState,
    {
        let bundle = skupper_bundle(self.settings);
        for secret in bundle.secret_names() {
            let existing = live
                .get::<Secret>(&placement.namespace, secret)
                .await
                .context(error::KubeApiSnafu {
                    component: SKUPPER,
                    operation: "get",
                    kind: "Secret",
                    name: secret,
                })?;
            ensure!(
                existing.is_some(),
                error::MissingSecretSnafu {
                    component: SKUPPER,
                    secret,
                }
            );
            log.trace(format!("Found secret '{}'", secret));
        }
        converge_bundle(live, &bundle, placement, log).await?;
        Ok(())
    }
}
