use crate::component::{converge_bundle, ComponentReconciler, ControllerEndpoint};
use crate::error::{self, Result};
use crate::live::LiveState;
use crate::logging::PassLogger;
use crate::token::TokenSource;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use model::constants::KUBELET;
use model::system::{kubelet_bundle, Placement, KUBELET_ARG_COUNT, KUBELET_TOKEN_ARG_INDEX};
use snafu::{OptionExt, ResultExt};

/// Converges the ioFog kubelet, which registers with the controller at `endpoint`. The token it
/// registers with is kept stable across passes by reading it back from the live kubelet.
pub(crate) struct KubeletReconciler<'a, T> {
    pub(crate) image: &'a str,
    pub(crate) endpoint: &'a ControllerEndpoint,
    pub(crate) tokens: &'a T,
}

#[async_trait]
impl<'a, T> ComponentReconciler for KubeletReconciler<'a, T>
where
    T: TokenSource,
{
    type Output = ();

    fn name(&self) -> &'static str {
        KUBELET
    }

    async fn reconcile<L>(&self, live: &L, placement: &Placement, log: &PassLogger) -> Result<()>
    where
        L: LiveState,
    {
        let existing = live
            .get::<Deployment>(&placement.namespace, KUBELET)
            .await
            .context(error::KubeApiSnafu {
                component: KUBELET,
                operation: "get",
                kind: "Deployment",
                name: KUBELET,
            })?;

        let token = match existing {
            Some(deployment) => {
                log.trace("Reusing the token of the live kubelet");
                existing_token(&deployment)?
            }
            None => {
                log.debug(format!(
                    "Minting a kubelet token for the controller at '{}'",
                    self.endpoint
                ));
                self.tokens
                    .mint(self.endpoint)
                    .await
                    .context(error::MintTokenSnafu { component: KUBELET })?
            }
        };

        let bundle = kubelet_bundle(
            self.image,
            &placement.namespace,
            &token,
            &self.endpoint.to_string(),
        );
        converge_bundle(live, &bundle, placement, log).await?;
        Ok(())
    }
}

/// The token the live kubelet `deployment` was given. The deployment must have a single container
/// whose arguments are shaped the way the kubelet bundle renders them, otherwise it was modified
/// out-of-band and is not touched.
fn existing_token(deployment: &Deployment) -> Result<String> {
    let containers = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .map(|pod| pod.containers.as_slice())
        .unwrap_or_default();
    let container = match containers {
        [container] => container,
        _ => {
            return error::MalformedLiveStateSnafu {
                component: KUBELET,
                kind: "Deployment",
                what: "containers",
                expected: 1usize,
                found: containers.len(),
            }
            .fail()
        }
    };

    let args = container.args.as_deref().unwrap_or_default();
    let shape_error = error::MalformedLiveStateSnafu {
        component: KUBELET,
        kind: "Deployment",
        what: "arguments",
        expected: KUBELET_ARG_COUNT,
        found: args.len(),
    };
    if args.len() != KUBELET_ARG_COUNT {
        return shape_error.fail();
    }
    args.get(KUBELET_TOKEN_ARG_INDEX)
        .cloned()
        .context(shape_error)
}
