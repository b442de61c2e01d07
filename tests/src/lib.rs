//! Shared helpers for the converge integration tests.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

pub use converge_test_utils::fixtures;
pub use converge_test_utils::{init_test_tracing, FlakyStore, InMemoryStore};

/// Run `change` after `delay`, on the test runtime.
///
/// On a paused clock the delay elapses as soon as every other task is idle, so
/// the change lands between two polls of the engine.
pub fn after<F>(delay: Duration, change: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        change();
    })
}

/// Await a background change, surfacing its panic in the test.
pub async fn settle(handle: JoinHandle<()>) {
    if let Err(err) = handle.await {
        std::panic::resume_unwind(err.into_panic());
    }
}

/// Drive `fut` and return its output together with the virtual time it took.
pub async fn timed<F: Future>(fut: F) -> (F::Output, Duration) {
    let start = tokio::time::Instant::now();
    let out = fut.await;
    (out, start.elapsed())
}
