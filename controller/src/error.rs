use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

/// An error produced by a token source, e.g. when the controller refuses to issue a token.
pub type TokenError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a reconciliation pass. None of these are retried internally; the controller
/// loop requeues the `ControlPlane` and the next pass resumes from whatever live state exists.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "Unable to decode the user password of control plane '{}': {}",
        control_plane,
        source
    ))]
    DecodePassword {
        control_plane: String,
        source: model::Error,
    },

    #[snafu(display(
        "Control plane '{}' has no uid, objects cannot be owned by it",
        control_plane
    ))]
    MissingUid { control_plane: String },

    #[snafu(display(
        "Unable to {} control plane '{}' in namespace '{}': {}",
        operation,
        name,
        namespace,
        source
    ))]
    ControlPlaneApi {
        operation: String,
        namespace: String,
        name: String,
        source: kube::Error,
    },

    #[snafu(display(
        "Unable to {} {} '{}' for component '{}': {}",
        operation,
        kind,
        name,
        component,
        source
    ))]
    KubeApi {
        component: String,
        operation: String,
        kind: String,
        name: String,
        source: kube::Error,
    },

    #[snafu(display(
        "The live {} of component '{}' was modified out-of-band: expected {} {} but found {}",
        kind,
        component,
        expected,
        what,
        found
    ))]
    MalformedLiveState {
        component: String,
        kind: String,
        what: String,
        expected: usize,
        found: usize,
    },

    #[snafu(display(
        "The endpoint of component '{}' has not been assigned by service '{}' yet",
        component,
        service
    ))]
    EndpointPending { component: String, service: String },

    #[snafu(display(
        "Component '{}' mounts secret '{}' which does not exist",
        component,
        secret
    ))]
    MissingSecret { component: String, secret: String },

    #[snafu(display("Unable to obtain a token for component '{}': {}", component, source))]
    MintToken {
        component: String,
        source: TokenError,
    },

    #[snafu(display("Unable to serialize {} '{}': {}", kind, name, source))]
    SerializeObject {
        kind: String,
        name: String,
        source: serde_json::Error,
    },

    #[snafu(display("Unable to read settings from the environment: {}", source))]
    Settings { source: envy::Error },
}

impl Error {
    /// The managed component this error is attributed to, if any.
    pub fn component(&self) -> Option<&str> {
        match self {
            Error::KubeApi { component, .. }
            | Error::MalformedLiveState { component, .. }
            | Error::EndpointPending { component, .. }
            | Error::MissingSecret { component, .. }
            | Error::MintToken { component, .. } => Some(component.as_str()),
            Error::DecodePassword { .. }
            | Error::MissingUid { .. }
            | Error::ControlPlaneApi { .. }
            | Error::SerializeObject { .. }
            | Error::Settings { .. } => None,
        }
    }
}
