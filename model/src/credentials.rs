use crate::error::{self, Result};
use snafu::ResultExt;

/// Decodes a credential that is stored base64 encoded in the `ControlPlane` resource. Input that
/// is not standard, padded base64, or that does not decode to UTF-8, is rejected.
pub fn decode<S>(encoded: S) -> Result<String>
where
    S: AsRef<str>,
{
    let bytes = base64::decode(encoded.as_ref()).context(error::Base64Snafu)?;
    Ok(String::from_utf8(bytes).context(error::Utf8Snafu)?)
}
