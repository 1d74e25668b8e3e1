//! "In-flight or settled" result cells.
//!
//! A [`FlightCell`] holds at most one shared future. Callers ask for the
//! current one and either join it or replace it with a fresh one, depending
//! on its age and outcome. The cell's lock is never held across an await, so
//! deciding and installing happen atomically between suspension points.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;

use crate::error::ApiResult;

pub type SharedResult<T> = Shared<BoxFuture<'static, ApiResult<T>>>;

struct Flight<T> {
    started_at: Instant,
    future: SharedResult<T>,
}

/// What a reuse policy gets to look at.
pub struct FlightView<'a, T> {
    /// Time since the flight was started (not since it settled).
    pub age: Duration,
    /// `None` while still in flight.
    pub outcome: Option<&'a ApiResult<T>>,
}

pub struct FlightCell<T> {
    slot: Mutex<Option<Flight<T>>>,
}

impl<T> Default for FlightCell<T> {
    fn default() -> Self {
        FlightCell {
            slot: Mutex::new(None),
        }
    }
}

impl<T> FlightCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the current flight if `keep` accepts it, otherwise install the
    /// future produced by `start` and return that. `start` is only called
    /// when a new flight is needed.
    pub fn get_or_start_with<K, F, Fut>(&self, keep: K, start: F) -> SharedResult<T>
    where
        K: FnOnce(FlightView<'_, T>) -> bool,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let mut slot = self.slot.lock().expect("flight cell mutex poisoned");
        if let Some(flight) = slot.as_ref() {
            let view = FlightView {
                age: flight.started_at.elapsed(),
                outcome: flight.future.peek(),
            };
            if keep(view) {
                return flight.future.clone();
            }
        }

        let future = start().boxed().shared();
        *slot = Some(Flight {
            started_at: Instant::now(),
            future: future.clone(),
        });
        future
    }

    /// Memoize the first flight forever, whatever its outcome.
    pub fn get_or_start<F, Fut>(&self, start: F) -> SharedResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        self.get_or_start_with(|_| true, start)
    }

    /// Reuse the current flight until it is older than `max_age`.
    /// Failed flights are reused too, which damps retries.
    pub fn get_or_start_fresh<F, Fut>(&self, max_age: Duration, start: F) -> SharedResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        self.get_or_start_with(|view| view.age <= max_age, start)
    }

    /// Reuse the current flight unless it settled with an error.
    pub fn get_or_start_unless_failed<F, Fut>(&self, start: F) -> SharedResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        self.get_or_start_with(|view| !matches!(view.outcome, Some(Err(_))), start)
    }

    pub fn is_empty(&self) -> bool {
        self.slot
            .lock()
            .expect("flight cell mutex poisoned")
            .is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_start(
        starts: &Arc<AtomicUsize>,
        result: ApiResult<u32>,
    ) -> impl FnOnce() -> BoxFuture<'static, ApiResult<u32>> {
        let starts = starts.clone();
        move || {
            starts.fetch_add(1, Ordering::SeqCst);
            async move { result }.boxed()
        }
    }

    #[tokio::test]
    async fn test_memoized_flight_is_shared() {
        let cell = FlightCell::new();
        let starts = Arc::new(AtomicUsize::new(0));

        let a = cell.get_or_start(counting_start(&starts, Ok(7)));
        let b = cell.get_or_start(counting_start(&starts, Ok(8)));

        assert_eq!(a.await.unwrap(), 7);
        assert_eq!(b.await.unwrap(), 7);
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_flight_is_replaced_when_requested() {
        let cell = FlightCell::new();
        let starts = Arc::new(AtomicUsize::new(0));

        let first =
            cell.get_or_start_unless_failed(counting_start(&starts, Err(ApiError::Transport)));
        assert!(first.await.is_err());

        let second = cell.get_or_start_unless_failed(counting_start(&starts, Ok(1)));
        assert_eq!(second.await.unwrap(), 1);

        let third = cell.get_or_start_unless_failed(counting_start(&starts, Ok(2)));
        assert_eq!(third.await.unwrap(), 1);
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_flight_expires_by_start_time() {
        let cell = FlightCell::new();
        let starts = Arc::new(AtomicUsize::new(0));
        let max_age = Duration::from_secs(60);

        assert!(cell.is_empty());
        cell.get_or_start_fresh(max_age, counting_start(&starts, Ok(1)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;
        let still_cached = cell
            .get_or_start_fresh(max_age, counting_start(&starts, Ok(2)))
            .await
            .unwrap();
        assert_eq!(still_cached, 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        let refreshed = cell
            .get_or_start_fresh(max_age, counting_start(&starts, Ok(3)))
            .await
            .unwrap();
        assert_eq!(refreshed, 3);
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }
}
