//! Detached persistence tasks.
//!
//! Writes dispatched after a response has been sent run on their own
//! task with their own bounded deadline, detached from the inbound
//! request's cancellation. Failures are logged, never surfaced.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::RecallResult;

/// Spawn a fire-and-forget write with its own deadline.
///
/// The returned handle is never awaited by request paths; tests await it
/// to observe completion deterministically.
pub fn spawn_detached<F>(name: &'static str, deadline: Duration, fut: F) -> JoinHandle<()>
where
    F: Future<Output = RecallResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match tokio::time::timeout(deadline, fut).await {
            Ok(Ok(())) => debug!(task = name, "Detached write completed"),
            Ok(Err(e)) => warn!(task = name, error = %e, "Detached write failed"),
            Err(_) => warn!(task = name, deadline_ms = deadline.as_millis() as u64, "Detached write timed out"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecallError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_detached_write_runs_to_completion() {
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();

        let handle = spawn_detached("save", Duration::from_secs(1), async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        handle.await.unwrap();
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_detached_write_absorbs_errors() {
        let handle = spawn_detached("save", Duration::from_secs(1), async {
            Err(RecallError::upstream("store unreachable"))
        });

        // The task itself completes cleanly; the error is only logged.
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_write_times_out() {
        let handle = spawn_detached("save", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        });

        handle.await.unwrap();
    }
}
