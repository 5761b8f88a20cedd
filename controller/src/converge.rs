use crate::error::{self, Result};
use crate::live::{LiveState, ManagedObject};
use crate::logging::PassLogger;
use serde_json::Value;
use snafu::ResultExt;

/// What converging one object did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Convergence {
    Created,
    Updated,
    Unchanged,
}

/// Make the live object named like `desired` match it. The object is created if it does not
/// exist, and replaced with `desired` if any field that `desired` sets differs from the live
/// object. Returns the live object after convergence.
pub(crate) async fn converge<L, K>(
    live: &L,
    component: &str,
    namespace: &str,
    mut desired: K,
    log: &PassLogger,
) -> Result<(Convergence, K)>
where
    L: LiveState,
    K: ManagedObject,
{
    let kind = K::kind(&()).to_string();
    let name = desired.meta().name.clone().unwrap_or_default();
    let current = live
        .get::<K>(namespace, &name)
        .await
        .context(error::KubeApiSnafu {
            component,
            operation: "get",
            kind: &kind,
            name: &name,
        })?;

    let current = match current {
        None => {
            log.debug(format!("Creating {} '{}' for '{}'", kind, name, component));
            let created = live
                .create(namespace, &desired)
                .await
                .context(error::KubeApiSnafu {
                    component,
                    operation: "create",
                    kind: &kind,
                    name: &name,
                })?;
            log.info(format!("Created {} '{}'", kind, name));
            return Ok((Convergence::Created, created));
        }
        Some(current) => current,
    };

    if !diverges(&desired, &current).context(error::SerializeObjectSnafu {
        kind: &kind,
        name: &name,
    })? {
        log.trace(format!("{} '{}' is up to date", kind, name));
        return Ok((Convergence::Unchanged, current));
    }

    log.debug(format!("Updating {} '{}' for '{}'", kind, name, component));
    desired.adopt(&current);
    let updated = live
        .replace(namespace, &name, &desired)
        .await
        .context(error::KubeApiSnafu {
            component,
            operation: "update",
            kind: &kind,
            name: &name,
        })?;
    log.info(format!("Updated {} '{}'", kind, name));
    Ok((Convergence::Updated, updated))
}

/// Whether `live` differs from `desired` in any field `desired` controls. Metadata other than
/// labels, annotations and owner references is owned by k8s and ignored, as are fields that k8s
/// defaults and `desired` leaves unset.
pub(crate) fn diverges<K>(desired: &K, live: &K) -> serde_json::Result<bool>
where
    K: ManagedObject,
{
    let desired = controlled_fields(serde_json::to_value(desired)?);
    let live = serde_json::to_value(live)?;
    Ok(!is_subset(&desired, &live))
}

fn controlled_fields(mut value: Value) -> Value {
    if let Some(object) = value.as_object_mut() {
        object.remove("status");
        if let Some(Value::Object(metadata)) = object.get_mut("metadata") {
            metadata.retain(|key, _| {
                matches!(
                    key.as_str(),
                    "labels" | "annotations" | "ownerReferences"
                )
            });
        }
    }
    value
}

/// Every value set in `desired` is present and equal in `live`. Arrays must have the same length
/// and match element by element.
fn is_subset(desired: &Value, live: &Value) -> bool {
    match (desired, live) {
        (Value::Object(desired), Value::Object(live)) => {
            desired.iter().all(|(key, value)| match live.get(key) {
                Some(live_value) => is_subset(value, live_value),
                None => value.is_null(),
            })
        }
        (Value::Array(desired), Value::Array(live)) => {
            desired.len() == live.len()
                && desired
                    .iter()
                    .zip(live.iter())
                    .all(|(desired, live)| is_subset(desired, live))
        }
        (desired, live) => desired == live,
    }
}
