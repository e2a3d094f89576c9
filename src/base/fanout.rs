// Actuator fan-out
//
// Issues the same operation to every actuator in a set concurrently and
// joins all of them before reporting. A failure never leaves launched
// operations unawaited; the first error (in actuator order) is returned
// after every future has completed.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;

/// Run `op` against every actuator concurrently and wait for all of them.
///
/// Returns the per-actuator results in order, or the first error once every
/// operation has finished.
pub async fn broadcast<A, T, E, F, Fut>(actuators: &[Arc<A>], op: F) -> Result<Vec<T>, E>
where
    A: ?Sized,
    F: Fn(Arc<A>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let results = join_all(actuators.iter().cloned().map(op)).await;
    results.into_iter().collect()
}
