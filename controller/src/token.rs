use crate::component::ControllerEndpoint;
use crate::error::TokenError;
use async_trait::async_trait;

/// Mints the token the kubelet registers with. A token is only minted when no kubelet exists
/// yet; afterwards the token is read back from the live kubelet.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn mint(&self, endpoint: &ControllerEndpoint) -> Result<String, TokenError>;
}

/// Mints random tokens without contacting the controller.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidTokenSource;

#[async_trait]
impl TokenSource for UuidTokenSource {
    async fn mint(&self, _endpoint: &ControllerEndpoint) -> Result<String, TokenError> {
        Ok(uuid::Uuid::new_v4().to_simple().to_string())
    }
}
