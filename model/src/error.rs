use snafu::Snafu;

#[derive(Debug, Snafu)]
pub struct Error(OpaqueError);
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum OpaqueError {
    #[snafu(display("Encoded credential is not valid base64: {}", source))]
    Base64 { source: base64::DecodeError },

    #[snafu(display("Decoded credential is not valid UTF-8: {}", source))]
    Utf8 { source: std::string::FromUtf8Error },

    #[snafu(display("Unable to serialize CRD to YAML: {}", source))]
    CrdYaml { source: serde_yaml::Error },
}
