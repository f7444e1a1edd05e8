use std::sync::LockResult;

use tracing::warn;

/// Unwraps a lock acquisition, taking the guard back from a poisoned lock.
pub(crate) fn recover<G>(result: LockResult<G>, target: &'static str, op: &'static str) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            op,
            target_module = target,
            result = "poisoned_recovered",
            "Recovered from poisoned lock; state may be stale after a panic elsewhere"
        );
        poisoned.into_inner()
    })
}
