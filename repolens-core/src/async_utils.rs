//! Async utilities and patterns
//!
//! Concurrency control for fan-out over repositories and order-preserving collection

use crate::error::{ErrorContext, RepoLensError, RepoLensResult};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Counting admission gate bounding how many operations run at once
///
/// Clones share the same permits, so one limiter instance bounds every caller
/// that holds a clone of it.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl ConcurrencyLimiter {
    /// Create a new limiter; a limit of zero is raised to one
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Number of operations that could start right now without waiting
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `operation` once a slot is free
    ///
    /// The future is not polled until the slot is acquired, and the slot is
    /// released as soon as it settles, whether it succeeded or failed.
    pub async fn run<F, T>(&self, operation: F) -> RepoLensResult<T>
    where
        F: Future<Output = RepoLensResult<T>>,
    {
        let _permit = self.permits.acquire().await.map_err(|e| RepoLensError::Internal {
            message: format!("Concurrency limiter closed: {}", e),
            source: Some(Arc::new(e)),
            context: ErrorContext::new("concurrency_limiter").with_operation("run"),
        })?;

        debug!(
            in_flight = self.max_concurrent - self.permits.available_permits(),
            max_concurrent = self.max_concurrent,
            "Admitted operation"
        );

        operation.await
    }
}

/// Drive every future concurrently and return the outputs in input order
///
/// Each future is tagged with its position and written into a pre-sized slot,
/// so completion order never leaks into the result.
pub async fn join_all_ordered<I, F>(futures: I) -> Vec<F::Output>
where
    I: IntoIterator<Item = F>,
    F: Future,
{
    let mut pending: FuturesUnordered<_> = futures
        .into_iter()
        .enumerate()
        .map(|(index, future)| async move { (index, future.await) })
        .collect();

    let mut slots: Vec<Option<F::Output>> = Vec::with_capacity(pending.len());
    slots.resize_with(pending.len(), || None);

    while let Some((index, output)) = pending.next().await {
        slots[index] = Some(output);
    }

    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_join_all_ordered_keeps_input_order() {
        let delays = [40u64, 5, 25, 0, 10];
        let futures = delays.iter().enumerate().map(|(i, delay)| async move {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
            i
        });

        let results = join_all_ordered(futures).await;
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_join_all_ordered_empty() {
        let results: Vec<u8> = join_all_ordered(Vec::<std::future::Ready<u8>>::new()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_limiter_bounds_in_flight_operations() {
        let limiter = ConcurrencyLimiter::new(2);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..6).map(|_| {
            let limiter = limiter.clone();
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            async move {
                limiter
                    .run(async {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, RepoLensError>(())
                    })
                    .await
            }
        });

        let results = join_all_ordered(tasks).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test]
    async fn test_limiter_releases_slot_on_failure() {
        let limiter = ConcurrencyLimiter::new(1);
        let failed: RepoLensResult<()> = limiter
            .run(async { Err(RepoLensError::internal("boom", "test")) })
            .await;
        assert!(failed.is_err());
        assert_eq!(limiter.available(), 1);

        let ok = limiter.run(async { Ok(7) }).await.unwrap();
        assert_eq!(ok, 7);
    }

    #[test]
    fn test_zero_limit_is_raised() {
        assert_eq!(ConcurrencyLimiter::new(0).max_concurrent(), 1);
    }
}
