// Bounded concurrent fan-out

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Run `fetch` for every item with at most `ceiling` calls in flight,
/// returning outputs in input order.
///
/// Per-item failures do not abort the batch: the caller supplies a fetch
/// that already maps its own failures into the output type. A panicking
/// or cancelled task yields the `fallback` value for its slot.
pub async fn bounded_fanout<I, T, F, Fut>(
    items: Vec<I>,
    ceiling: usize,
    fallback: T,
    fetch: F,
) -> Vec<T>
where
    I: Send + 'static,
    T: Clone + Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(ceiling.max(1)));
    let mut set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let future = fetch(item);
        set.spawn(async move {
            // Closed only when the whole fan-out is dropped
            let _permit = semaphore.acquire_owned().await;
            (index, future.await)
        });
    }

    let mut results: Vec<Option<T>> = vec![None; set.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, value)) => results[index] = Some(value),
            Err(e) => warn!(error = %e, "Fan-out task did not complete"),
        }
    }

    results
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| fallback.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_preserves_input_order() {
        let out = bounded_fanout(vec![3u64, 1, 2], 2, 0, |n| async move {
            // Later items finish first
            tokio::time::sleep(Duration::from_millis(n * 10)).await;
            n * 100
        })
        .await;
        assert_eq!(out, vec![300, 100, 200]);
    }

    #[tokio::test]
    async fn test_respects_concurrency_ceiling() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let items: Vec<usize> = (0..8).collect();
        let out = bounded_fanout(items, 3, 0usize, |n| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                n
            }
        })
        .await;

        assert_eq!(out.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let out: Vec<u32> = bounded_fanout(Vec::<u32>::new(), 4, 0, |n| async move { n }).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_zero_ceiling_is_clamped() {
        let out = bounded_fanout(vec![1u32, 2], 0, 0, |n| async move { n }).await;
        assert_eq!(out, vec![1, 2]);
    }
}
