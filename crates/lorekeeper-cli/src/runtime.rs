//! Tokio runtime with a bounded shutdown.
//!
//! A timed-out semantic check leaves its blocking provider call running.
//! Dropping a runtime waits for such calls, so the binary shuts down with a
//! fixed grace period instead.

use std::future::Future;
use std::io;
use std::time::Duration;
use tracing::debug;

/// How long blocking tasks get to finish once the command has completed
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Run `future` to completion on a fresh multi-threaded runtime, then shut
/// the runtime down without waiting longer than [`SHUTDOWN_GRACE`].
pub fn block_on_bounded<F: Future>(future: F) -> io::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let output = runtime.block_on(future);

    debug!("Shutting down runtime (grace {:?})", SHUTDOWN_GRACE);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_returns_future_output() {
        let value = block_on_bounded(async { 40 + 2 }).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_abandoned_blocking_task_does_not_hold_shutdown() {
        let start = Instant::now();

        let outcome = block_on_bounded(async {
            let slow = tokio::task::spawn_blocking(|| {
                std::thread::sleep(Duration::from_secs(5));
            });
            tokio::time::timeout(Duration::from_millis(100), slow).await
        })
        .unwrap();

        assert!(outcome.is_err(), "The blocking task should have timed out");
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "Shutdown waited {:?} for the blocking task",
            start.elapsed()
        );
    }
}
